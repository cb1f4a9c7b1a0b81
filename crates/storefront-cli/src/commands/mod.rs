//! Subcommand implementations
//!
//! Each command returns the text to print so it can be tested without a
//! process.

pub mod list;
pub mod migrate;
pub mod show;

use clap::ValueEnum;

/// Entity kinds addressable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Address,
    Customer,
    Distributor,
    Order,
    OrderItem,
    Payment,
    Product,
    ProductType,
    Wishlist,
    WishlistItem,
}

/// Run `$body` with `$repo` bound to the repository for `$kind`
macro_rules! with_repository {
    ($session:expr, $kind:expr, |$repo:ident| $body:expr) => {
        match $kind {
            $crate::commands::Kind::Address => { let $repo = $session.addresses(); $body }
            $crate::commands::Kind::Customer => { let $repo = $session.customers(); $body }
            $crate::commands::Kind::Distributor => { let $repo = $session.distributors(); $body }
            $crate::commands::Kind::Order => { let $repo = $session.orders(); $body }
            $crate::commands::Kind::OrderItem => { let $repo = $session.order_items(); $body }
            $crate::commands::Kind::Payment => { let $repo = $session.payments(); $body }
            $crate::commands::Kind::Product => { let $repo = $session.products(); $body }
            $crate::commands::Kind::ProductType => { let $repo = $session.product_types(); $body }
            $crate::commands::Kind::Wishlist => { let $repo = $session.wishlists(); $body }
            $crate::commands::Kind::WishlistItem => { let $repo = $session.wishlist_items(); $body }
        }
    };
}

pub(crate) use with_repository;
