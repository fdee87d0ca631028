use serde::{Deserialize, Serialize};

/// A fixed catalog record returned by id lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl Item {
    /// Look up an item. Unknown ids produce a "not found" placeholder
    /// carrying the requested id rather than an error.
    pub fn lookup(id: i64) -> Self {
        match id {
            1 => Self {
                id,
                name: "Q4 Sales Report".to_string(),
                description: "Aggregated quarterly sales data with key metrics.".to_string(),
            },
            2 => Self {
                id,
                name: "Stock Analysis".to_string(),
                description: "Current inventory detail and future projections.".to_string(),
            },
            _ => Self::not_found(id),
        }
    }

    pub fn not_found(id: i64) -> Self {
        Self {
            id,
            name: format!("Item Not Found (#{})", id),
            description: "The requested ID does not match any known item.".to_string(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::not_found(self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_return_fixed_records() {
        let first = Item::lookup(1);
        assert_eq!(first.name, "Q4 Sales Report");
        assert!(!first.is_placeholder());

        let second = Item::lookup(2);
        assert_eq!(second.id, 2);
        assert_eq!(second.name, "Stock Analysis");
    }

    #[test]
    fn lookup_is_total() {
        for id in [0, 3, -1, 42, i64::MIN, i64::MAX] {
            let item = Item::lookup(id);
            assert_eq!(item.id, id);
            assert!(item.is_placeholder());
            assert!(item.name.contains("Not Found"));
            assert!(item.name.contains(&id.to_string()));
        }
    }
}
