use once_cell::sync::Lazy;

use crate::model::NewStall;

/// Example stalls written into an empty registry on first initialization.
pub static SEED_STALLS: Lazy<Vec<NewStall>> = Lazy::new(|| {
    vec![
        NewStall::new(
            "Joe's Street Tacos",
            "Downtown",
            "Authentic Mexican street tacos with homemade salsas",
            "Al Pastor Tacos",
            8.0,
            "https://images.unsplash.com/photo-1613514785940-daed07799d9b?w=800",
        )
        .with_rating(4.5),
        NewStall::new(
            "Mei's Dumplings",
            "Chinatown",
            "Handmade dumplings and noodles, family recipes",
            "Xiaolongbao",
            12.0,
            "https://images.unsplash.com/photo-1563245372-f21724e3856d?w=800",
        )
        .with_rating(4.8),
        NewStall::new(
            "Curry Express",
            "Little India",
            "Quick and delicious Indian street food",
            "Butter Chicken",
            10.0,
            "https://images.unsplash.com/photo-1585937421612-70a008356fbe?w=800",
        )
        .with_rating(4.2),
    ]
});
