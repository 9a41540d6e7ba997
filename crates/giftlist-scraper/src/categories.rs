//! The retailer's catalog categories, keyed by the numeric ids its listing
//! URLs use (`categories.html?cat=<id>&p=<page>`).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub id: &'static str,
    pub name: &'static str,
}

pub const CATEGORIES: &[Category] = &[
    Category { id: "1289", name: "ELECTRICAL APPLIANCES" },
    Category { id: "1326", name: "FURNITURE" },
    Category { id: "1352", name: "SUPERMARKET" },
    Category { id: "1435", name: "LIGHTING & HARDWARE" },
    Category { id: "1277", name: "MOBILES & COMPUTERS" },
    Category { id: "1337", name: "HOME & KITCHEN ESSENTIALS" },
    Category { id: "1383", name: "SPORTS & FITNESS" },
    Category { id: "3159", name: "BOOKS & STATIONERY" },
    Category { id: "3208", name: "FASHION & LUGGAGE" },
    Category { id: "3570", name: "BABY SUPPLIES" },
    Category { id: "1387", name: "TOYS & ENTERTAINMENT" },
];

#[must_use]
pub fn find_category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}
