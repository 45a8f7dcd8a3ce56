//! Canned Kijiji markup for tests

/// Listing page builder; the default renders every field
pub struct ListingPage {
    pub title: Option<String>,
    pub price: String,
    pub address: String,
    pub id: String,
    pub attributes: Vec<String>,
    pub breadcrumb: Option<String>,
    pub description: Vec<String>,
}

impl Default for ListingPage {
    fn default() -> Self {
        Self {
            title: Some("Bright 2 bedroom near the lake".to_string()),
            price: "$1,850".to_string(),
            address: "100 Queen St W, Toronto, ON".to_string(),
            id: "1500123456".to_string(),
            attributes: vec![
                attribute_row("Bedrooms", "2 bedrooms"),
                attribute_row("Bathrooms", "1 bathroom"),
                attribute_row("Furnished", "No"),
                attribute_row("Pet Friendly", "Yes"),
                attribute_row("Size (sqft)", "750"),
            ],
            breadcrumb: Some("2 Bedroom Apartments for Rent in City of Toronto".to_string()),
            description: vec![
                "Sunny unit with a view.".to_string(),
                "Steps from the streetcar.".to_string(),
            ],
        }
    }
}

impl ListingPage {
    pub fn with_id(id: u64, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: Some(title.to_string()),
            ..Self::default()
        }
    }

    pub fn render(&self) -> String {
        let title = self
            .title
            .as_ref()
            .map(|t| format!(r#"<h1 class="title-3283765216">{t}</h1>"#))
            .unwrap_or_default();

        let breadcrumb = self
            .breadcrumb
            .as_ref()
            .map(|crumb| {
                format!(
                    r#"<li class="crumbItem-1566965652"><h1 class="crumbH1-75073251"><a class="crumbLink-3348846382" href="/b-city"><span itemprop="name">{crumb}</span></a></h1></li>"#
                )
            })
            .unwrap_or_default();

        let description: String = self
            .description
            .iter()
            .map(|line| format!("<p>{line}</p>"))
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html>
<head><title>Kijiji</title></head>
<body>
  <nav><ol>
    {breadcrumb}
    <li class="currentCrumb-2617455686"><span>{id}</span></li>
  </ol></nav>
  <div class="mainColumn">
    {title}
    <span class="currentPrice-2872355490"><span>{price}</span></span>
    <span class="address-2932131783">  {address}  </span>
    <div class="attributes">{attributes}</div>
    <div class="descriptionContainer-2832520341">
      <h3>Description</h3>
      <div>{description}</div>
    </div>
  </div>
</body>
</html>"#,
            id = self.id,
            price = self.price,
            address = self.address,
            attributes = self.attributes.concat(),
        )
    }
}

pub fn attribute_row(label: &str, value: &str) -> String {
    format!(
        r#"<dl class="itemAttribute-304821756"><dt class="attributeLabel-240934283">{label}</dt><dd class="attributeValue-1550499923">{value}</dd></dl>"#
    )
}

/// Search results page with a "Showing X - Y out of Z Ads" summary
pub fn category_page(listing_paths: &[&str], first: u64, last: u64, total: u64) -> String {
    let ads: String = listing_paths
        .iter()
        .enumerate()
        .map(|(i, path)| {
            format!(
                r#"<div class="search-item regular-ad" data-listing-id="{i}" data-ad-id="{i}" data-vip-url="{path}"><a href="{path}">Ad {i}</a></div>"#
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<body>
  <div class="col-2">
    <div class="top-bar">
      <div class="showing">
        Showing {first} - {last} out of {total} Ads
      </div>
    </div>
    <div class="container-results large-images">
      <div class="search-item top-feature" data-ad-id="999">Featured without link</div>
      {ads}
    </div>
  </div>
</body>
</html>"#
    )
}

/// Top-level page listing subcategories in its navigation
pub fn subcategory_page(entries: &[(u64, &str, &str)]) -> String {
    let items: String = entries
        .iter()
        .map(|(id, title, href)| {
            format!(
                r#"<li><a class="category-selected" data-event="ChangeCategory" data-id="{id}" href="{href}">
                  {title}
                </a></li>"#
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<body>
  <div class="content">
    <ul>
      {items}
      <li><a class="category-link" data-event="ChangeCategory" data-id="1" href="/b-other/c1">Unselected</a></li>
    </ul>
  </div>
</body>
</html>"#
    )
}
