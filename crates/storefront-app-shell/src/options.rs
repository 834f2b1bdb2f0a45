use storefront_api::DEFAULT_API_BASE;
use storefront_state::{APPEAR_DELAY_MILLIS, CART_STORAGE_KEY, DEFAULT_PAGE_SIZE, PHONE_STORAGE_KEY};

pub const ENV_API_BASE: &str = "STOREFRONT_API_BASE";
pub const ENV_PAGE_SIZE: &str = "STOREFRONT_PAGE_SIZE";
pub const ENV_APPEAR_DELAY_MS: &str = "STOREFRONT_APPEAR_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontOptions {
    pub api_base: String,
    pub page_size: u32,
    pub appear_delay_millis: u64,
    pub cart_key: String,
    pub phone_key: String,
}

impl Default for StorefrontOptions {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_owned(),
            page_size: DEFAULT_PAGE_SIZE,
            appear_delay_millis: APPEAR_DELAY_MILLIS,
            cart_key: CART_STORAGE_KEY.to_owned(),
            phone_key: PHONE_STORAGE_KEY.to_owned(),
        }
    }
}

impl StorefrontOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with the `STOREFRONT_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    /// Values that fail to parse are ignored with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();
        if let Some(base) = lookup(ENV_API_BASE).filter(|base| !base.trim().is_empty()) {
            options.api_base = base.trim().to_owned();
        }
        if let Some(size) = parse_var::<u32>(&lookup, ENV_PAGE_SIZE) {
            if size == 0 {
                log::warn!("ignoring {ENV_PAGE_SIZE}=0");
            } else {
                options.page_size = size;
            }
        }
        if let Some(delay) = parse_var::<u64>(&lookup, ENV_APPEAR_DELAY_MS) {
            options.appear_delay_millis = delay;
        }
        options
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_appear_delay_millis(mut self, delay: u64) -> Self {
        self.appear_delay_millis = delay;
        self
    }

    pub fn with_cart_key(mut self, key: impl Into<String>) -> Self {
        self.cart_key = key.into();
        self
    }

    pub fn with_phone_key(mut self, key: impl Into<String>) -> Self {
        self.phone_key = key.into();
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring unparseable {name}={raw:?}");
            None
        }
    }
}
