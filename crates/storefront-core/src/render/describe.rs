use std::fmt;

use crate::model::{
    Address, Customer, Distributor, Handle, Order, OrderItem, PaymentInfo, Product, ProductType,
    Wishlist, WishlistItem,
};

/// One-line description of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary(String);

impl Summary {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Multi-line description: scalar fields plus the currently cached child
/// collections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detail {
    pub heading: String,
    pub fields: Vec<(String, String)>,
    pub sections: Vec<(String, Vec<Summary>)>,
}

impl Detail {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            fields: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, value: impl fmt::Display) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn section<T: Describe>(mut self, name: &str, children: impl Iterator<Item = Handle<T>>) -> Self {
        let lines = children.map(|h| h.read().describe()).collect();
        self.sections.push((name.to_string(), lines));
        self
    }

    /// Value of a named field, if present
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.heading)?;
        for (name, value) in &self.fields {
            writeln!(f, "  {}: {}", name, value)?;
        }
        for (name, lines) in &self.sections {
            writeln!(f, "  {} ({}):", name, lines.len())?;
            for line in lines {
                writeln!(f, "    - {}", line)?;
            }
        }
        Ok(())
    }
}

/// Entities that can produce display text from their fields and their
/// cached child collections
pub trait Describe {
    fn describe(&self) -> Summary;

    fn describe_detailed(&self) -> Detail;
}

fn money(value: f64) -> String {
    format!("{:.2}", value)
}

impl Describe for Address {
    fn describe(&self) -> Summary {
        let apartment = self
            .apartment
            .as_deref()
            .map(|a| format!(" Apt {}", a))
            .unwrap_or_default();
        Summary::new(format!(
            "{}{}, {}, {} {}, {}",
            self.street, apartment, self.city, self.state, self.zip, self.country
        ))
    }

    fn describe_detailed(&self) -> Detail {
        let types: Vec<&str> = self.types.iter().map(|t| t.as_str()).collect();
        Detail::new(format!("Address #{}", self.id))
            .field("street", &self.street)
            .field("apartment", self.apartment.as_deref().unwrap_or("-"))
            .field("city", &self.city)
            .field("state", &self.state)
            .field("zip", &self.zip)
            .field("country", &self.country)
            .field("types", types.join(", "))
    }
}

impl Describe for Customer {
    fn describe(&self) -> Summary {
        Summary::new(format!("#{} {} <{}>", self.id, self.full_name(), self.email))
    }

    fn describe_detailed(&self) -> Detail {
        Detail::new(format!("Customer #{}", self.id))
            .field("name", self.full_name())
            .field("email", &self.email)
            .field("phone", &self.phone)
            .section("orders", self.orders.iter().cloned())
            .section("wishlists", self.wishlists.iter().cloned())
    }
}

impl Describe for Order {
    fn describe(&self) -> Summary {
        Summary::new(format!(
            "Order #{} on {} [{}] {} item(s), total {}",
            self.id,
            self.order_date,
            self.status,
            self.items.len(),
            money(self.total_price())
        ))
    }

    fn describe_detailed(&self) -> Detail {
        Detail::new(format!("Order #{}", self.id))
            .field("customer", self.customer_id)
            .field("date", self.order_date)
            .field("status", self.status)
            .field("shipping address", self.shipping_id)
            .field("payment", self.payment_id)
            .field("total", money(self.total_price()))
            .section("items", self.items.iter().cloned())
    }
}

impl Describe for OrderItem {
    fn describe(&self) -> Summary {
        Summary::new(format!(
            "product #{} x{} @ {}",
            self.product_id,
            self.quantity,
            money(self.unit_price)
        ))
    }

    fn describe_detailed(&self) -> Detail {
        Detail::new(format!("Order item #{}", self.id))
            .field("order", self.order_id)
            .field("product", self.product_id)
            .field("quantity", self.quantity)
            .field("unit price", money(self.unit_price))
            .field("line total", money(self.line_total()))
    }
}

impl Describe for Wishlist {
    fn describe(&self) -> Summary {
        Summary::new(format!(
            "Wishlist #{} '{}' ({} item(s))",
            self.id,
            self.name,
            self.items.len()
        ))
    }

    fn describe_detailed(&self) -> Detail {
        Detail::new(format!("Wishlist #{}", self.id))
            .field("name", &self.name)
            .field("customer", self.customer_id)
            .section("items", self.items.iter().cloned())
    }
}

impl Describe for WishlistItem {
    fn describe(&self) -> Summary {
        Summary::new(format!("product #{} x{}", self.product_id, self.quantity))
    }

    fn describe_detailed(&self) -> Detail {
        Detail::new(format!("Wishlist item #{}", self.id))
            .field("wishlist", self.wishlist_id)
            .field("product", self.product_id)
            .field("quantity", self.quantity)
    }
}

impl Describe for Product {
    fn describe(&self) -> Summary {
        Summary::new(format!(
            "#{} {} @ {} ({} in stock)",
            self.id,
            self.name,
            money(self.unit_price),
            self.quantity
        ))
    }

    fn describe_detailed(&self) -> Detail {
        let distributor = self
            .distributor_id
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        Detail::new(format!("Product #{}", self.id))
            .field("name", &self.name)
            .field("description", &self.description)
            .field("unit price", money(self.unit_price))
            .field("quantity", self.quantity)
            .field("in stock", self.is_in_stock())
            .field("distributor", distributor)
            .section("categories", self.categories.iter().cloned())
    }
}

impl Describe for ProductType {
    fn describe(&self) -> Summary {
        Summary::new(self.name.clone())
    }

    fn describe_detailed(&self) -> Detail {
        Detail::new(format!("Category #{}", self.id)).field("name", &self.name)
    }
}

impl Describe for Distributor {
    fn describe(&self) -> Summary {
        Summary::new(format!(
            "Distributor #{} ({}), {} product(s)",
            self.id,
            self.phone,
            self.products.len()
        ))
    }

    fn describe_detailed(&self) -> Detail {
        Detail::new(format!("Distributor #{}", self.id))
            .field("phone", &self.phone)
            .field("address", self.address_id)
            .section("products", self.products.iter().cloned())
    }
}

impl Describe for PaymentInfo {
    fn describe(&self) -> Summary {
        Summary::new(format!(
            "{} {} card ending {}",
            self.first_name,
            self.last_name,
            self.card_suffix()
        ))
    }

    fn describe_detailed(&self) -> Detail {
        Detail::new(format!("Payment #{}", self.id))
            .field("card holder", format!("{} {}", self.first_name, self.last_name))
            .field("card", format!("**** {}", self.card_suffix()))
            .field("expires", self.exp_date.format("%m/%y"))
            .field("billing address", self.billing_address_id)
    }
}
