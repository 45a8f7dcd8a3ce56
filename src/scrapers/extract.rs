//! Field extractors for Kijiji listing pages
//!
//! Every extractor reads one field from a parsed listing document. Optional
//! attributes resolve to `None` when the page does not carry them; required
//! fields fail with [`ScrapeError::MissingField`]. Labels outside the known
//! vocabulary fail loudly so markup changes surface instead of being guessed at.

use crate::scrapers::error::{Result, ScrapeError};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, error, warn};

const TITLE: &str = "h1.title-3283765216";
const PRICE: &str = "span.currentPrice-2872355490";
const ADDRESS: &str = "span.address-2932131783";
const CURRENT_CRUMB: &str = "li.currentCrumb-2617455686 span";
const ATTRIBUTE: &str = "dl.itemAttribute-304821756";
const ATTRIBUTE_VALUE: &str = "dd.attributeValue-1550499923";
const DESCRIPTION: &str = "div.descriptionContainer-2832520341";
const BREADCRUMB_NAME: &str =
    "li.crumbItem-1566965652 h1.crumbH1-75073251 a.crumbLink-3348846382 span[itemprop=\"name\"]";

/// Bedroom attribute labels as rendered on listing pages
pub static BEDROOM_VOCABULARY: &[(&str, u8)] = &[
    ("1 Bedroom", 1),
    ("1 bedroom", 1),
    ("1 bedroom + den", 2),
    ("1 bedroom and den", 2),
    ("1 Bedroom + Den", 2),
    ("2 bedrooms", 3),
    ("2 Bedroom", 3),
    ("2 bedrooms and den", 4),
    ("3 Bedroom", 5),
    ("3 bedrooms", 5),
    ("4 bedrooms", 6),
    ("5 bedrooms", 7),
    ("6 or more bedrooms", 8),
    ("Bachelor or studio", 9),
    ("Bachelor & Studio", 9),
    ("4+ Bedroom", 10),
];

/// Breadcrumb fragments naming a bedroom category, checked in order
pub static BREADCRUMB_BEDROOMS: &[(&str, u8)] = &[
    ("1 Bedroom", 1),
    ("1 Bedroom + Den", 2),
    ("2 Bedroom", 3),
    ("3 Bedroom", 5),
    ("4+ Bedroom", 10),
    ("Bachelor & Studio", 9),
];

pub static BATHROOM_VOCABULARY: &[(&str, u8)] = &[
    ("1 bathroom", 1),
    ("1.5 bathrooms", 2),
    ("2 bathrooms", 3),
    ("2.5 bathrooms", 4),
    ("3 bathrooms", 5),
    ("3.5 bathrooms", 6),
    ("4 bathrooms", 7),
    ("4.5 bathrooms", 8),
    ("5 bathrooms", 9),
    ("5.5 bathrooms", 10),
    ("6 or more bathrooms", 11),
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector must parse")
}

/// Text nodes that are direct children of `element`
pub(crate) fn own_text<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|text| &**text))
}

fn lookup(table: &[(&str, u8)], key: &str) -> Option<u8> {
    table
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, code)| *code)
}

/// Value of the `<dl>` attribute row whose text contains `label`
fn attribute_value(document: &Html, label: &str) -> Option<String> {
    let row_selector = selector(ATTRIBUTE);
    let value_selector = selector(ATTRIBUTE_VALUE);

    for row in document.select(&row_selector) {
        if !row.text().collect::<String>().contains(label) {
            continue;
        }
        for value in row.select(&value_selector) {
            if let Some(text) = own_text(value).next() {
                return Some(text.trim().to_string());
            }
        }
    }

    None
}

fn yes_no(field: &'static str, value: &str) -> Result<bool> {
    match value {
        "Yes" => Ok(true),
        "No" => Ok(false),
        other => {
            error!("invalid \"{}\" attribute value: {:?}", field, other);
            Err(ScrapeError::UnknownVocabulary {
                field,
                value: other.to_string(),
            })
        }
    }
}

/// Listing title with whitespace collapsed
/// `None` means the page came back without one; the caller may re-fetch.
pub fn extract_title(document: &Html) -> Option<String> {
    let title_selector = selector(TITLE);
    let fragments: Vec<&str> = document.select(&title_selector).flat_map(own_text).collect();

    let title = fragments
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        warn!("\"title\" attribute not found");
        return None;
    }

    debug!("\"title\" attribute extraction successful");
    Some(title)
}

/// Asking price; "Please Contact" and "Swap/Trade" become `0.0`
pub fn extract_price(document: &Html) -> Result<f64> {
    let price_selector = selector(PRICE);

    // The amount is either the span's own text or wrapped in a nested span
    let raw = document
        .select(&price_selector)
        .flat_map(|price| price.descendants())
        .filter(|node| {
            node.parent()
                .and_then(|parent| parent.value().as_element().map(|el| el.name() == "span"))
                .unwrap_or(false)
        })
        .filter_map(|node| node.value().as_text().map(|text| text.trim()))
        .find(|text| !text.is_empty());

    let Some(raw) = raw else {
        error!("\"price\" attribute not found");
        return Err(ScrapeError::MissingField("price"));
    };

    if raw == "Please Contact" || raw == "Swap/Trade" {
        debug!("\"price\" is {:?}, using 0.0", raw);
        return Ok(0.0);
    }

    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let price = cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| ScrapeError::MalformedField {
            field: "price",
            value: raw.to_string(),
        })?;

    debug!("\"price\" attribute extraction successful");
    Ok(price)
}

pub fn extract_address(document: &Html) -> Result<String> {
    let address_selector = selector(ADDRESS);

    match document
        .select(&address_selector)
        .flat_map(own_text)
        .map(str::trim)
        .find(|text| !text.is_empty())
    {
        Some(text) => {
            debug!("\"address\" attribute extraction successful");
            Ok(text.to_string())
        }
        None => {
            error!("\"address\" attribute not found");
            Err(ScrapeError::MissingField("address"))
        }
    }
}

/// Ad id shown in the current breadcrumb
pub fn extract_id(document: &Html) -> Result<u64> {
    let crumb_selector = selector(CURRENT_CRUMB);

    let Some(raw) = document.select(&crumb_selector).flat_map(own_text).next() else {
        error!("\"id\" attribute not found");
        return Err(ScrapeError::MissingField("id"));
    };

    let id = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ScrapeError::MalformedField {
            field: "id",
            value: raw.to_string(),
        })?;

    debug!("\"id\" attribute extraction successful");
    Ok(id)
}

/// Description paragraphs, each terminated by a newline
pub fn extract_description(document: &Html) -> Result<String> {
    let container_selector = selector(DESCRIPTION);

    let Some(container) = document.select(&container_selector).next() else {
        error!("\"description\" attribute not found");
        return Err(ScrapeError::MissingField("description"));
    };

    let mut description = String::new();
    for node in container.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        // Only text inside the container's inner blocks belongs to the body
        let in_block = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != container.id())
            .any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|el| el.name() == "div")
            });

        if in_block {
            description.push_str(text);
            description.push('\n');
        }
    }

    if description.is_empty() {
        error!("\"description\" attribute not found");
        return Err(ScrapeError::MissingField("description"));
    }

    debug!("\"description\" attribute extraction successful");
    Ok(description)
}

pub fn extract_pet_friendly(document: &Html) -> Result<Option<bool>> {
    match attribute_value(document, "Pet Friendly") {
        Some(value) => {
            let flag = yes_no("pet friendly", &value)?;
            debug!("\"pet friendly\" attribute extraction successful");
            Ok(Some(flag))
        }
        None => {
            debug!("\"pet friendly\" attribute not found");
            Ok(None)
        }
    }
}

pub fn extract_furnished(document: &Html) -> Result<Option<bool>> {
    match attribute_value(document, "Furnished") {
        Some(value) => {
            let flag = yes_no("furnished", &value)?;
            debug!("\"furnished\" attribute extraction successful");
            Ok(Some(flag))
        }
        None => {
            debug!("\"furnished\" attribute not found");
            Ok(None)
        }
    }
}

/// Floor area as rendered (square feet on Kijiji)
pub fn extract_size(document: &Html) -> Result<Option<f64>> {
    let Some(value) = attribute_value(document, "Size") else {
        debug!("\"size\" attribute not found");
        return Ok(None);
    };

    let size = value
        .replace(',', "")
        .parse::<f64>()
        .map_err(|_| ScrapeError::MalformedField {
            field: "size",
            value: value.clone(),
        })?;

    debug!("\"size\" attribute extraction successful");
    Ok(Some(size))
}

pub fn extract_bathroom_count(document: &Html) -> Result<Option<u8>> {
    let Some(value) = attribute_value(document, "Bathroom") else {
        debug!("\"bathroom quantity\" attribute not found");
        return Ok(None);
    };

    match lookup(BATHROOM_VOCABULARY, &value) {
        Some(code) => Ok(Some(code)),
        None => {
            error!("unrecognized \"bathroom quantity\" value: {:?}", value);
            Err(ScrapeError::UnknownVocabulary {
                field: "bathroom quantity",
                value,
            })
        }
    }
}

/// Bedroom code from the attribute list, falling back to the breadcrumb
pub fn extract_bedroom_count(document: &Html) -> Result<Option<u8>> {
    if let Some(value) = attribute_value(document, "Bedroom") {
        return match lookup(BEDROOM_VOCABULARY, &value) {
            Some(code) => Ok(Some(code)),
            None => {
                error!("unrecognized \"bedroom quantity\" value: {:?}", value);
                Err(ScrapeError::UnknownVocabulary {
                    field: "bedroom quantity",
                    value,
                })
            }
        };
    }

    let crumb_selector = selector(BREADCRUMB_NAME);
    if let Some(crumb) = document.select(&crumb_selector).flat_map(own_text).next() {
        let code = BREADCRUMB_BEDROOMS
            .iter()
            .find(|(fragment, _)| crumb.contains(fragment))
            .map(|(_, code)| *code);
        if code.is_some() {
            return Ok(code);
        }
    }

    debug!("\"bedroom quantity\" attribute not found");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::fixtures::{attribute_row, ListingPage};

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn page_with_attribute(label: &str, value: &str) -> Html {
        parse(
            &ListingPage {
                attributes: vec![attribute_row(label, value)],
                ..ListingPage::default()
            }
            .render(),
        )
    }

    #[test]
    fn test_extracts_every_field_from_full_page() {
        let doc = parse(&ListingPage::default().render());

        assert_eq!(extract_title(&doc).as_deref(), Some("Bright 2 bedroom near the lake"));
        assert_eq!(extract_price(&doc).unwrap(), 1850.0);
        assert_eq!(extract_address(&doc).unwrap(), "100 Queen St W, Toronto, ON");
        assert_eq!(extract_id(&doc).unwrap(), 1500123456);
        assert_eq!(extract_bedroom_count(&doc).unwrap(), Some(3));
        assert_eq!(extract_bathroom_count(&doc).unwrap(), Some(1));
        assert_eq!(extract_furnished(&doc).unwrap(), Some(false));
        assert_eq!(extract_pet_friendly(&doc).unwrap(), Some(true));
        assert_eq!(extract_size(&doc).unwrap(), Some(750.0));
        assert_eq!(
            extract_description(&doc).unwrap(),
            "Sunny unit with a view.\nSteps from the streetcar.\n"
        );
    }

    #[test]
    fn test_title_collapses_whitespace() {
        let doc = parse(r#"<h1 class="title-3283765216">  Cozy   studio
            downtown </h1>"#);
        assert_eq!(extract_title(&doc).as_deref(), Some("Cozy studio downtown"));
    }

    #[test]
    fn test_missing_title_is_not_an_error() {
        let doc = parse("<html><body><p>Loading...</p></body></html>");
        assert_eq!(extract_title(&doc), None);
    }

    #[test]
    fn test_price_special_values() {
        for label in ["Please Contact", "Swap/Trade"] {
            let doc = parse(&format!(r#"<span class="currentPrice-2872355490">{label}</span>"#));
            assert_eq!(extract_price(&doc).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_price_strips_currency_and_separators() {
        let doc = parse(r#"<span class="currentPrice-2872355490">$1,250</span>"#);
        assert_eq!(extract_price(&doc).unwrap(), 1250.0);

        let doc = parse(r#"<span class="currentPrice-2872355490"><span>$2,100.00</span></span>"#);
        assert_eq!(extract_price(&doc).unwrap(), 2100.0);
    }

    #[test]
    fn test_missing_price_is_fatal() {
        let doc = parse("<html><body></body></html>");
        assert!(matches!(extract_price(&doc), Err(ScrapeError::MissingField("price"))));
    }

    #[test]
    fn test_garbled_price_is_malformed() {
        let doc = parse(r#"<span class="currentPrice-2872355490">call me</span>"#);
        assert!(matches!(
            extract_price(&doc),
            Err(ScrapeError::MalformedField { field: "price", .. })
        ));
    }

    #[test]
    fn test_required_fields_missing() {
        let doc = parse("<html><body></body></html>");
        assert!(matches!(extract_address(&doc), Err(ScrapeError::MissingField("address"))));
        assert!(matches!(extract_id(&doc), Err(ScrapeError::MissingField("id"))));
        assert!(matches!(
            extract_description(&doc),
            Err(ScrapeError::MissingField("description"))
        ));
    }

    #[test]
    fn test_pet_friendly_values() {
        let doc = page_with_attribute("Pet Friendly", "Yes");
        assert_eq!(extract_pet_friendly(&doc).unwrap(), Some(true));

        let doc = page_with_attribute("Pet Friendly", "No");
        assert_eq!(extract_pet_friendly(&doc).unwrap(), Some(false));

        let doc = page_with_attribute("Pet Friendly", "Maybe");
        assert!(matches!(
            extract_pet_friendly(&doc),
            Err(ScrapeError::UnknownVocabulary { field: "pet friendly", .. })
        ));
    }

    #[test]
    fn test_furnished_rejects_unknown_value() {
        let doc = page_with_attribute("Furnished", "Partially");
        assert!(matches!(
            extract_furnished(&doc),
            Err(ScrapeError::UnknownVocabulary { field: "furnished", .. })
        ));
    }

    #[test]
    fn test_furnished_values() {
        let doc = page_with_attribute("Furnished", "Yes");
        assert_eq!(extract_furnished(&doc).unwrap(), Some(true));

        let doc = page_with_attribute("Furnished", "No");
        assert_eq!(extract_furnished(&doc).unwrap(), Some(false));
    }

    #[test]
    fn test_unknown_bedroom_label_is_fatal() {
        let doc = page_with_attribute("Bedrooms", "7 bedrooms");
        assert!(matches!(
            extract_bedroom_count(&doc),
            Err(ScrapeError::UnknownVocabulary { field: "bedroom quantity", .. })
        ));
    }

    #[test]
    fn test_unparsable_size_is_malformed() {
        let doc = page_with_attribute("Size (sqft)", "Not Available");
        assert!(matches!(
            extract_size(&doc),
            Err(ScrapeError::MalformedField { field: "size", .. })
        ));
    }

    #[test]
    fn test_non_numeric_id_is_malformed() {
        let doc = parse(
            &ListingPage {
                id: "Apartments".to_string(),
                ..ListingPage::default()
            }
            .render(),
        );
        assert!(matches!(
            extract_id(&doc),
            Err(ScrapeError::MalformedField { field: "id", .. })
        ));
    }

    #[test]
    fn test_optional_attributes_absent() {
        let doc = parse(
            &ListingPage {
                attributes: vec![],
                breadcrumb: None,
                ..ListingPage::default()
            }
            .render(),
        );

        assert_eq!(extract_furnished(&doc).unwrap(), None);
        assert_eq!(extract_pet_friendly(&doc).unwrap(), None);
        assert_eq!(extract_size(&doc).unwrap(), None);
        assert_eq!(extract_bathroom_count(&doc).unwrap(), None);
        assert_eq!(extract_bedroom_count(&doc).unwrap(), None);
    }

    #[test]
    fn test_size_with_thousands_separator() {
        let doc = page_with_attribute("Size (sqft)", "1,200");
        assert_eq!(extract_size(&doc).unwrap(), Some(1200.0));
    }

    #[test]
    fn test_bedroom_vocabulary_maps_every_label() {
        for (label, code) in BEDROOM_VOCABULARY {
            let doc = page_with_attribute("Bedrooms", label);
            assert_eq!(extract_bedroom_count(&doc).unwrap(), Some(*code), "label {label:?}");
        }
    }

    #[test]
    fn test_bathroom_vocabulary_maps_every_label() {
        for (label, code) in BATHROOM_VOCABULARY {
            let doc = page_with_attribute("Bathrooms", label);
            assert_eq!(extract_bathroom_count(&doc).unwrap(), Some(*code), "label {label:?}");
        }
        assert_eq!(BATHROOM_VOCABULARY.len(), 11);
    }

    #[test]
    fn test_unknown_bathroom_label_is_fatal() {
        let doc = page_with_attribute("Bathrooms", "7 bathrooms");
        assert!(matches!(
            extract_bathroom_count(&doc),
            Err(ScrapeError::UnknownVocabulary { field: "bathroom quantity", .. })
        ));
    }

    #[test]
    fn test_bedroom_falls_back_to_breadcrumb() {
        let cases = [
            // "1 Bedroom" is listed first, so it also claims the den crumb
            ("1 Bedroom + Den Apartments for Rent in Toronto", Some(1)),
            ("2 Bedroom Apartments for Rent in Toronto", Some(3)),
            ("1 Bedroom Apartments for Rent in Toronto", Some(1)),
            ("4+ Bedroom Houses for Rent", Some(10)),
            ("Bachelor & Studio Apartments for Rent", Some(9)),
            ("Room Rentals & Roommates in Toronto", None),
        ];

        for (crumb, expected) in cases {
            let doc = parse(
                &ListingPage {
                    attributes: vec![],
                    breadcrumb: Some(crumb.to_string()),
                    ..ListingPage::default()
                }
                .render(),
            );
            assert_eq!(extract_bedroom_count(&doc).unwrap(), expected, "crumb {crumb:?}");
        }
    }

    #[test]
    fn test_description_skips_container_level_text() {
        let doc = parse(
            r#"<div class="descriptionContainer-2832520341">
                 <h2>Description</h2>
                 <div><p>First line</p>Second line<br><b>Third</b></div>
               </div>"#,
        );
        assert_eq!(
            extract_description(&doc).unwrap(),
            "First line\nSecond line\nThird\n"
        );
    }
}
