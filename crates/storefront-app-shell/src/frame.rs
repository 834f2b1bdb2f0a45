//! Plain data handed to whatever draws the storefront.

use std::fmt;

use storefront_api::ProductId;
use storefront_state::{CartLineItem, ReviewFeedState};

#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
    /// Past its entrance delay.
    pub visible: bool,
}

impl ProductCard {
    /// A zero quantity shows the buy button instead of the stepper.
    pub fn shows_buy(&self) -> bool {
        self.quantity == 0
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CatalogView {
    pub cards: Vec<ProductCard>,
    pub loading: bool,
    pub error: Option<String>,
    pub has_more: bool,
    pub end_of_catalog: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartView {
    pub items: Vec<CartLineItem>,
    pub total_price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckoutView {
    pub phone_display: String,
    pub phone_placeholder: String,
    pub error: Option<String>,
    pub loading: bool,
    pub modal_open: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StorefrontFrame {
    pub catalog: CatalogView,
    pub cart: CartView,
    pub checkout: CheckoutView,
    pub reviews: ReviewFeedState,
}

impl StorefrontFrame {
    pub fn card(&self, id: ProductId) -> Option<&ProductCard> {
        self.catalog.cards.iter().find(|card| card.id == id)
    }
}

impl fmt::Display for StorefrontFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reviews = &self.reviews;
        if reviews.loading {
            writeln!(f, "reviews: loading")?;
        } else if let Some(error) = &reviews.error {
            writeln!(f, "reviews: error: {error}")?;
        } else {
            writeln!(f, "reviews: {}", reviews.reviews.len())?;
        }

        let catalog = &self.catalog;
        writeln!(f, "products: {}", catalog.cards.len())?;
        for card in &catalog.cards {
            let marker = if card.visible { ' ' } else { '~' };
            if card.shows_buy() {
                writeln!(f, " {marker}[{}] {} {}₽ [купить]", card.id, card.title, card.price)?;
            } else {
                writeln!(
                    f,
                    " {marker}[{}] {} {}₽ [- {} +]",
                    card.id, card.title, card.price, card.quantity
                )?;
            }
        }
        if let Some(error) = &catalog.error {
            writeln!(f, "Ошибка: {error}")?;
        }
        if catalog.loading {
            writeln!(f, "Загрузка...")?;
        }
        if catalog.end_of_catalog {
            writeln!(f, "Больше товаров нет")?;
        }

        writeln!(f, "cart:")?;
        for item in &self.cart.items {
            writeln!(f, "  {} x{} = {}₽", item.title, item.qty, item.subtotal())?;
        }
        writeln!(f, "  total: {}₽", self.cart.total_price)?;

        let checkout = &self.checkout;
        writeln!(f, "phone: {}", checkout.phone_placeholder)?;
        if let Some(error) = &checkout.error {
            writeln!(f, "  {error}")?;
        }
        if checkout.loading {
            writeln!(f, "  sending order...")?;
        }
        if checkout.modal_open {
            writeln!(f, "Заказ успешно оформлен!")?;
        }
        Ok(())
    }
}
