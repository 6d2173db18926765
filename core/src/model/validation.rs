// core/src/model/validation.rs

//! Pure field validation shared by the product forms and the CSV importer.

use super::product::{ProductFields, ProductInput};
use crate::error::ValidationErrors;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use url::{Host, Url};

pub const NAME_MAX_CHARS: usize = 120;
pub const CATEGORY_MAX_CHARS: usize = 60;
pub const IMAGE_URL_MAX_CHARS: usize = 200;
pub const PRICE_FRACTION_DIGITS: u32 = 2;
/// NUMERIC(10,2): ten digits in total, two of them after the point.
pub const PRICE_INTEGER_DIGITS: u32 = 8;
pub const STOCK_MAX: i64 = i32::MAX as i64;

const URL_SCHEMES: [&str; 4] = ["http", "https", "ftp", "ftps"];

/// Parses a decimal in plain (`12.50`) or scientific (`1.25e1`) notation.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
  if raw.is_empty() {
    return None;
  }
  Decimal::from_str(raw)
    .or_else(|_| Decimal::from_scientific(raw))
    .ok()
}

/// Rounds half away from zero to two places and pins the scale, so `25` renders as `25.00`.
pub fn normalize_price(price: Decimal) -> Decimal {
  let mut rounded = price.round_dp_with_strategy(PRICE_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero);
  rounded.rescale(PRICE_FRACTION_DIGITS);
  if rounded.is_zero() {
    rounded.set_sign_positive(true);
  }
  rounded
}

fn price_limit() -> Decimal {
  Decimal::from(10_i64.pow(PRICE_INTEGER_DIGITS))
}

/// Price rules common to forms and imports: parseable, non-negative, storable.
///
/// `raw` must already be trimmed. The returned value is normalized to two places.
pub fn check_price(raw: &str) -> Result<Decimal, String> {
  let price = parse_decimal(raw).ok_or_else(|| format!("invalid price '{}'", raw))?;
  if price.is_sign_negative() && !price.is_zero() {
    return Err("price must be ≥ 0".to_string());
  }
  let price = normalize_price(price);
  if price >= price_limit() {
    return Err(format!(
      "price must have at most {} digits before the decimal point",
      PRICE_INTEGER_DIGITS
    ));
  }
  Ok(price)
}

/// Stock rules common to forms and imports. `raw` must already be trimmed.
pub fn check_stock(raw: &str) -> Result<i32, String> {
  let stock = raw
    .parse::<i128>()
    .map_err(|_| format!("invalid stock '{}'", raw))?;
  if stock < 0 {
    return Err("stock must be ≥ 0".to_string());
  }
  if stock > STOCK_MAX as i128 {
    return Err(format!("stock must be ≤ {}", STOCK_MAX));
  }
  Ok(stock as i32)
}

pub fn check_name_length(name: &str) -> Result<(), String> {
  if name.chars().count() > NAME_MAX_CHARS {
    return Err(format!("name must be at most {} characters", NAME_MAX_CHARS));
  }
  Ok(())
}

pub fn check_category_length(category: &str) -> Result<(), String> {
  if category.chars().count() > CATEGORY_MAX_CHARS {
    return Err(format!(
      "category must be at most {} characters",
      CATEGORY_MAX_CHARS
    ));
  }
  Ok(())
}

// Hostname labels: non-empty, at most 63 bytes, no leading or trailing hyphen.
fn valid_domain(domain: &str) -> bool {
  let domain = domain.strip_suffix('.').unwrap_or(domain);
  !domain.is_empty()
    && domain
      .split('.')
      .all(|label| !label.is_empty() && label.len() <= 63 && !label.starts_with('-') && !label.ends_with('-'))
}

/// Absolute URL with one of the accepted schemes and a well-formed host.
pub fn check_image_url(raw: &str) -> Result<(), String> {
  if raw.chars().count() > IMAGE_URL_MAX_CHARS {
    return Err(format!(
      "image_url must be at most {} characters",
      IMAGE_URL_MAX_CHARS
    ));
  }
  let invalid = || "enter a valid URL".to_string();
  if raw.chars().any(char::is_whitespace) {
    return Err(invalid());
  }
  let parsed = Url::parse(raw).map_err(|_| invalid())?;
  if !URL_SCHEMES.contains(&parsed.scheme()) {
    return Err(invalid());
  }
  // The parser skips surplus slashes, so `http:///x` would otherwise gain host `x`.
  let after_scheme = raw.get(parsed.scheme().len() + 1..).unwrap_or_default();
  if !after_scheme.starts_with("//") || after_scheme.starts_with("///") {
    return Err(invalid());
  }
  match parsed.host() {
    Some(Host::Domain(domain)) if valid_domain(domain) => Ok(()),
    Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => Ok(()),
    _ => Err(invalid()),
  }
}

/// Validates a product form submission, reporting every failed constraint.
pub fn validate_product(input: &ProductInput) -> Result<ProductFields, ValidationErrors> {
  let mut errors = ValidationErrors::new();

  let name = input.name.trim().to_string();
  if name.is_empty() {
    errors.add("name", "name is required");
  } else if let Err(msg) = check_name_length(&name) {
    errors.add("name", msg);
  }

  let category = input.category.trim().to_string();
  if let Err(msg) = check_category_length(&category) {
    errors.add("category", msg);
  }

  let price_raw = input.price.trim();
  let price = if price_raw.is_empty() {
    errors.add("price", "price is required");
    None
  } else {
    match parse_decimal(price_raw) {
      Some(parsed) if parsed.normalize().scale() > PRICE_FRACTION_DIGITS => {
        errors.add(
          "price",
          format!("price must have at most {} decimal places", PRICE_FRACTION_DIGITS),
        );
        None
      }
      _ => match check_price(price_raw) {
        Ok(price) => Some(price),
        Err(msg) => {
          errors.add("price", msg);
          None
        }
      },
    }
  };

  let stock_raw = input.stock.trim();
  let stock = if stock_raw.is_empty() {
    errors.add("stock", "stock is required");
    None
  } else {
    match check_stock(stock_raw) {
      Ok(stock) => Some(stock),
      Err(msg) => {
        errors.add("stock", msg);
        None
      }
    }
  };

  let image_url = input.image_url.trim().to_string();
  if !image_url.is_empty() {
    if let Err(msg) = check_image_url(&image_url) {
      errors.add("image_url", msg);
    }
  }

  match (price, stock) {
    (Some(price), Some(stock)) if errors.is_empty() => Ok(ProductFields {
      name,
      category,
      price,
      stock,
      description: input.description.trim().to_string(),
      image_url,
    }),
    _ => Err(errors),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input(name: &str, price: &str, stock: &str) -> ProductInput {
    ProductInput {
      name: name.to_string(),
      price: price.to_string(),
      stock: stock.to_string(),
      ..Default::default()
    }
  }

  #[test]
  fn valid_input_is_trimmed_and_typed() {
    let mut form = input("  Atlas Tee ", " 25 ", "42");
    form.category = " T-Shirts ".to_string();
    form.image_url = "https://example.com/tee.jpg".to_string();
    let fields = validate_product(&form).unwrap();
    assert_eq!(fields.name, "Atlas Tee");
    assert_eq!(fields.category, "T-Shirts");
    assert_eq!(fields.price.to_string(), "25.00");
    assert_eq!(fields.stock, 42);
  }

  #[test]
  fn collects_all_field_errors() {
    let mut form = input("", "-3", "x");
    form.image_url = "not a url".to_string();
    let errors = validate_product(&form).unwrap_err();
    assert_eq!(errors.for_field("name").collect::<Vec<_>>(), vec!["name is required"]);
    assert_eq!(errors.for_field("price").collect::<Vec<_>>(), vec!["price must be ≥ 0"]);
    assert_eq!(errors.for_field("stock").collect::<Vec<_>>(), vec!["invalid stock 'x'"]);
    assert_eq!(errors.for_field("image_url").count(), 1);
  }

  #[test]
  fn rejects_overlong_name_and_category() {
    let mut form = input(&"n".repeat(121), "1", "1");
    form.category = "c".repeat(61);
    let errors = validate_product(&form).unwrap_err();
    assert_eq!(errors.for_field("name").count(), 1);
    assert_eq!(errors.for_field("category").count(), 1);
  }

  #[test]
  fn form_price_allows_two_decimal_places_only() {
    assert!(validate_product(&input("a", "1.25", "0")).is_ok());
    assert!(validate_product(&input("a", "1.250", "0")).is_ok());
    let errors = validate_product(&input("a", "1.255", "0")).unwrap_err();
    assert_eq!(errors.for_field("price").count(), 1);
  }

  #[test]
  fn price_checks() {
    assert_eq!(check_price("0").unwrap().to_string(), "0.00");
    assert_eq!(check_price("1e2").unwrap().to_string(), "100.00");
    assert_eq!(check_price("2.005").unwrap().to_string(), "2.01");
    assert_eq!(check_price("abc").unwrap_err(), "invalid price 'abc'");
    assert!(check_price("100000000").is_err());
    assert!(check_price("99999999.99").is_ok());
  }

  #[test]
  fn stock_checks() {
    assert_eq!(check_stock("+7").unwrap(), 7);
    assert_eq!(check_stock("-1").unwrap_err(), "stock must be ≥ 0");
    assert_eq!(check_stock("1.5").unwrap_err(), "invalid stock '1.5'");
    assert!(check_stock("2147483648").is_err());
  }

  #[test]
  fn image_url_checks() {
    assert!(check_image_url("https://example.com/a.png").is_ok());
    assert!(check_image_url("ftp://files.example.com").is_ok());
    assert!(check_image_url("example.com/a.png").is_err());
    assert!(check_image_url("mailto://x").is_err());
    assert!(check_image_url("http:///path").is_err());
    assert!(check_image_url("https://example.com:notaport/a.png").is_err());
    assert!(check_image_url("http://exa..mple.com/a.png").is_err());
    assert!(check_image_url("http://[::1/a.png").is_err());
    assert!(check_image_url("http://-bad.example.com/a.png").is_err());
    assert!(check_image_url("HTTPS://Example.com:8443/a.png?x=1").is_ok());
    assert!(check_image_url("http://127.0.0.1/a.png").is_ok());
  }

  #[test]
  fn description_is_trimmed() {
    let mut form = input("Lamp", "12", "3");
    form.description = "  warm light \n".to_string();
    assert_eq!(validate_product(&form).unwrap().description, "warm light");
  }
}
