//! Show command
//!
//! Usage: storefront show <KIND> <ID> [--detailed]

use clap::Args;
use storefront_core::model::Entity;
use storefront_core::Describe;
use storefront_store::{Repository, Result, Storefront};

use super::{with_repository, Kind};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Entity kind
    #[arg(value_enum)]
    pub kind: Kind,

    /// Entity id
    pub id: i64,

    /// Include every field and child collection
    #[arg(short, long)]
    pub detailed: bool,
}

pub fn execute(storefront: &Storefront, args: ShowArgs) -> Result<String> {
    let session = storefront.session()?;
    with_repository!(session, args.kind, |repo| describe(&repo, args.id, args.detailed))
}

fn describe<R>(repo: &R, id: i64, detailed: bool) -> Result<String>
where
    R: Repository,
    <R::Entity as Entity>::Id: From<i64>,
{
    let handle = repo.from_id(id.into())?;
    let entity = handle.read();
    Ok(if detailed {
        format!("{}\n", entity.describe_detailed())
    } else {
        format!("{}\n", entity.describe())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::model::NewCustomer;
    use storefront_core::ExErrorKind;

    fn seeded() -> Storefront {
        let storefront = Storefront::in_memory();
        {
            let s = storefront.session().unwrap();
            let customer = s
                .customers()
                .create(NewCustomer {
                    first_name: "Ada".to_string(),
                    last_name: "Byron".to_string(),
                    email: "ada@example.com".to_string(),
                    phone: "555-0100".to_string(),
                })
                .unwrap();
            s.wishlists().create(customer.id(), "Gifts").unwrap();
        }
        storefront
    }

    #[test]
    fn test_show_detailed_includes_children() {
        let storefront = seeded();
        let args = ShowArgs {
            kind: Kind::Customer,
            id: 1,
            detailed: true,
        };
        let out = execute(&storefront, args).unwrap();
        assert!(out.contains("Ada"));
        assert!(out.contains("Gifts"));
    }

    #[test]
    fn test_show_missing_entity_is_not_found() {
        let storefront = seeded();
        let args = ShowArgs {
            kind: Kind::Order,
            id: 42,
            detailed: false,
        };
        let err = execute(&storefront, args).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }
}
