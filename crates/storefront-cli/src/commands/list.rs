//! List command
//!
//! Usage: storefront list <KIND>

use clap::Args;
use storefront_core::Describe;
use storefront_store::{Repository, Result, Storefront};

use super::{with_repository, Kind};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Entity kind to list
    #[arg(value_enum)]
    pub kind: Kind,
}

/// One summary line per entity, ordered by id
pub fn execute(storefront: &Storefront, args: ListArgs) -> Result<String> {
    let session = storefront.session()?;
    with_repository!(session, args.kind, |repo| summaries(&repo))
}

fn summaries<R: Repository>(repo: &R) -> Result<String> {
    let all = repo.list_all()?;
    if all.is_empty() {
        return Ok("(none)\n".to_string());
    }
    Ok(all
        .iter()
        .map(|h| format!("{}\n", h.read().describe()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::model::NewProduct;

    #[test]
    fn test_list_empty_kind() {
        let storefront = Storefront::in_memory();
        let out = execute(&storefront, ListArgs { kind: Kind::Customer }).unwrap();
        assert_eq!(out, "(none)\n");
    }

    #[test]
    fn test_list_products() {
        let storefront = Storefront::in_memory();
        {
            let s = storefront.session().unwrap();
            for (name, price) in [("Kite", 12.5), ("Yo-yo", 3.0)] {
                s.products()
                    .create(NewProduct {
                        name: name.to_string(),
                        description: String::new(),
                        quantity: 3,
                        unit_price: price,
                        distributor_id: None,
                    })
                    .unwrap();
            }
        }

        let out = execute(&storefront, ListArgs { kind: Kind::Product }).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines, vec!["#1 Kite @ 12.50 (3 in stock)", "#2 Yo-yo @ 3.00 (3 in stock)"]);
    }
}
