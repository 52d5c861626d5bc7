//! Static demo catalog shared by the specialist nodes.
//!
//! Stands in for real destination, weather, and inventory APIs so the
//! whole system runs deterministically without network access.

pub(crate) struct Destination {
    pub name: &'static str,
    pub country: &'static str,
    pub avg_daily_cost: u32,
    pub best_months: &'static [&'static str],
    pub highlights: &'static [&'static str],
    pub climate: &'static str,
    pub category: Category,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Category {
    Beach,
    Cultural,
    Adventure,
}

pub(crate) const DESTINATIONS: &[Destination] = &[
    Destination {
        name: "Bali, Indonesia",
        country: "Indonesia",
        avg_daily_cost: 60,
        best_months: &["April", "May", "June", "September", "October"],
        highlights: &["Beautiful beaches", "Hindu temples", "Rice terraces", "Vibrant culture"],
        climate: "Tropical",
        category: Category::Beach,
    },
    Destination {
        name: "Santorini, Greece",
        country: "Greece",
        avg_daily_cost: 150,
        best_months: &["May", "June", "September", "October"],
        highlights: &["Stunning sunsets", "White architecture", "Wine tasting", "Volcanic beaches"],
        climate: "Mediterranean",
        category: Category::Beach,
    },
    Destination {
        name: "Maldives",
        country: "Maldives",
        avg_daily_cost: 300,
        best_months: &["November", "December", "January", "February", "March"],
        highlights: &["Luxury overwater bungalows", "World-class diving", "Pristine beaches"],
        climate: "Tropical",
        category: Category::Beach,
    },
    Destination {
        name: "Kyoto, Japan",
        country: "Japan",
        avg_daily_cost: 100,
        best_months: &["March", "April", "May", "October", "November"],
        highlights: &["Ancient temples", "Traditional gardens", "Geisha districts", "Cherry blossoms"],
        climate: "Temperate",
        category: Category::Cultural,
    },
    Destination {
        name: "Rome, Italy",
        country: "Italy",
        avg_daily_cost: 120,
        best_months: &["April", "May", "September", "October"],
        highlights: &["Ancient ruins", "Vatican City", "Renaissance art", "Italian cuisine"],
        climate: "Mediterranean",
        category: Category::Cultural,
    },
    Destination {
        name: "Queenstown, New Zealand",
        country: "New Zealand",
        avg_daily_cost: 140,
        best_months: &["December", "January", "February", "March"],
        highlights: &["Bungee jumping", "Skydiving", "Hiking", "Scenic beauty"],
        climate: "Temperate",
        category: Category::Adventure,
    },
];

pub(crate) struct Weather {
    pub temp_range: &'static str,
    pub rainfall: &'static str,
    pub best_months: &'static str,
}

/// Fallback weather used for destinations outside the catalog.
pub(crate) const DEFAULT_WEATHER: Weather = Weather {
    temp_range: "20-25C",
    rainfall: "Medium",
    best_months: "Year-round",
};

pub(crate) fn weather_for(destination: &str) -> &'static Weather {
    const PATTERNS: &[(&str, Weather)] = &[
        ("bali", Weather { temp_range: "26-30C", rainfall: "Medium", best_months: "Apr-Oct" }),
        ("santorini", Weather { temp_range: "20-28C", rainfall: "Low", best_months: "May-Oct" }),
        ("maldives", Weather { temp_range: "26-30C", rainfall: "Low", best_months: "Nov-Apr" }),
        ("kyoto", Weather { temp_range: "15-25C", rainfall: "Medium", best_months: "Mar-May, Oct-Nov" }),
        ("rome", Weather { temp_range: "18-28C", rainfall: "Low", best_months: "Apr-Jun, Sep-Oct" }),
        ("queenstown", Weather { temp_range: "10-22C", rainfall: "Medium", best_months: "Dec-Mar" }),
    ];
    let key = destination.to_lowercase();
    PATTERNS
        .iter()
        .find(|(name, _)| key.contains(name))
        .map_or(&DEFAULT_WEATHER, |(_, w)| w)
}

/// Day-trip activities per destination, generic fallback for the rest.
pub(crate) fn activities_for(destination: &str) -> &'static [&'static str] {
    const BALI: &[&str] = &[
        "Visit Tanah Lot Temple at sunset",
        "Explore Ubud Rice Terraces",
        "Traditional Balinese cooking class",
        "Beach day at Seminyak",
        "Visit Monkey Forest Sanctuary",
        "Sunrise hike at Mount Batur",
        "Traditional market shopping in Ubud",
    ];
    const SANTORINI: &[&str] = &[
        "Explore Oia village and sunset viewing",
        "Wine tasting tour in local vineyards",
        "Visit ancient Akrotiri archaeological site",
        "Beach day at Red Beach",
        "Fira to Oia hiking trail",
        "Traditional Greek cooking class",
        "Boat tour to nearby islands",
    ];
    const KYOTO: &[&str] = &[
        "Visit Fushimi Inari Shrine",
        "Explore Bamboo Grove in Arashiyama",
        "Traditional tea ceremony experience",
        "Visit Kinkaku-ji (Golden Pavilion)",
        "Walk through Gion geisha district",
        "Explore Philosopher's Path",
        "Visit Nijo Castle and gardens",
    ];
    const GENERIC: &[&str] = &[
        "City orientation walking tour",
        "Visit main cultural attractions",
        "Local cuisine food tour",
        "Shopping and leisure time",
        "Nature or outdoor activities",
        "Museum and gallery visits",
        "Local market exploration",
    ];
    let key = destination.to_lowercase();
    if key.contains("bali") {
        BALI
    } else if key.contains("santorini") {
        SANTORINI
    } else if key.contains("kyoto") {
        KYOTO
    } else {
        GENERIC
    }
}

/// Cost factor relative to a generic destination.
pub(crate) fn cost_factor(destination: &str) -> f64 {
    const FACTORS: &[(&str, f64)] = &[
        ("bali", 0.7),
        ("santorini", 1.3),
        ("maldives", 2.5),
        ("kyoto", 1.2),
        ("rome", 1.1),
        ("queenstown", 1.4),
    ];
    let key = destination.to_lowercase();
    FACTORS
        .iter()
        .find(|(name, _)| key.contains(name))
        .map_or(1.0, |(_, f)| *f)
}

/// Best-effort destination extraction from free-form user text.
pub(crate) fn find_destination(text: &str) -> Option<&'static Destination> {
    let lower = text.to_lowercase();
    DESTINATIONS.iter().find(|d| {
        let city = d.name.split(',').next().unwrap_or(d.name).to_lowercase();
        lower.contains(&city)
    })
}
