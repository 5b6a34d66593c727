//! Static product-category catalog: keyword lists, contextual bonus terms and
//! the competitor roster for each category. Loaded once, never mutated.
//!
//! Declaration order matters twice: it breaks classifier ties, and the first
//! entry is the default category when nothing can be detected.

use std::sync::LazyLock;

use rivalscope_common::{CategoryProfile, CompetitorProfile};

static CATALOG: LazyLock<Vec<CategoryProfile>> = LazyLock::new(build_catalog);

/// All categories in declaration order.
pub fn catalog() -> &'static [CategoryProfile] {
    &CATALOG
}

/// The catalog's first category, used as the last-resort detection result.
pub fn default_category() -> &'static CategoryProfile {
    &CATALOG[0]
}

pub fn find_category(id: &str) -> Option<&'static CategoryProfile> {
    CATALOG.iter().find(|c| c.id == id)
}

/// Contextual terms that earn a category a one-off bonus when any of them
/// appears in the text.
pub fn context_terms(category_id: &str) -> &'static [&'static str] {
    CONTEXT_TERMS
        .iter()
        .find(|(id, _)| *id == category_id)
        .map(|(_, terms)| *terms)
        .unwrap_or(&[])
}

const CONTEXT_TERMS: &[(&str, &[&str])] = &[
    ("shoes", &["foot", "walk", "step", "run", "jog", "stride"]),
    ("clothing", &["wardrobe", "cotton", "fabric", "tailored", "casual"]),
    ("skincare", &["skin", "face", "routine", "glow", "complexion"]),
    ("electronics", &["battery", "device", "screen", "tech", "digital"]),
    ("jewelry", &["elegant", "luxury", "gift", "wedding", "sparkle"]),
    ("home_kitchen", &["cook", "recipe", "meal", "bake", "countertop"]),
    ("fitness", &["strength", "cardio", "muscle", "sweat", "health"]),
    ("beverages", &["refresh", "thirst", "flavor", "caffeine", "sip"]),
];

fn competitor(
    id: &str,
    name: &str,
    website: &str,
    search_terms: &[&str],
    product_types: &[&str],
) -> CompetitorProfile {
    CompetitorProfile {
        id: id.to_string(),
        name: name.to_string(),
        website: website.to_string(),
        search_terms: search_terms.iter().map(|s| s.to_string()).collect(),
        product_types: product_types.iter().map(|s| s.to_string()).collect(),
    }
}

fn category(
    id: &str,
    name: &str,
    keywords: &[&str],
    competitors: Vec<CompetitorProfile>,
) -> CategoryProfile {
    CategoryProfile {
        id: id.to_string(),
        name: name.to_string(),
        keywords: keywords.iter().map(|s| s.to_string()).collect(),
        competitors,
    }
}

fn build_catalog() -> Vec<CategoryProfile> {
    vec![
        category(
            "shoes",
            "Shoes",
            &[
                "shoe", "sneaker", "boot", "footwear", "running", "sandal", "heel", "loafer",
                "trainer", "sole", "slipper", "cleat", "insole",
            ],
            vec![
                competitor("nike", "Nike", "https://www.nike.com", &["Nike", "Nike Air"], &["running shoes", "sneakers", "trainers"]),
                competitor("adidas", "Adidas", "https://www.adidas.com", &["Adidas", "Adidas Originals"], &["sneakers", "running shoes", "football boots"]),
                competitor("new_balance", "New Balance", "https://www.newbalance.com", &["New Balance"], &["running shoes", "lifestyle sneakers"]),
                competitor("puma", "Puma", "https://www.puma.com", &["Puma"], &["sneakers", "training shoes"]),
            ],
        ),
        category(
            "clothing",
            "Clothing",
            &[
                "clothing", "apparel", "shirt", "dress", "jacket", "hoodie", "jeans", "pants",
                "sweater", "fashion", "outfit", "denim", "coat",
            ],
            vec![
                competitor("zara", "Zara", "https://www.zara.com", &["Zara"], &["dresses", "jackets", "shirts"]),
                competitor("hm", "H&M", "https://www.hm.com", &["H&M"], &["t-shirts", "jeans", "hoodies"]),
                competitor("uniqlo", "Uniqlo", "https://www.uniqlo.com", &["Uniqlo"], &["sweaters", "down jackets", "basics"]),
                competitor("levis", "Levi's", "https://www.levi.com", &["Levi's", "Levis"], &["jeans", "denim jackets"]),
            ],
        ),
        category(
            "skincare",
            "Skincare Products",
            &[
                "skincare", "serum", "moisturizer", "cream", "cleanser", "lotion", "toner",
                "sunscreen", "spf", "acne", "wrinkle", "anti-aging", "hydrating", "retinol",
            ],
            vec![
                competitor("the_ordinary", "The Ordinary", "https://theordinary.com", &["The Ordinary"], &["serum", "niacinamide serum", "retinol"]),
                competitor("cerave", "CeraVe", "https://www.cerave.com", &["CeraVe"], &["moisturizing cream", "cleanser"]),
                competitor("la_roche_posay", "La Roche-Posay", "https://www.laroche-posay.us", &["La Roche-Posay"], &["sunscreen", "moisturizer"]),
                competitor("olay", "Olay", "https://www.olay.com", &["Olay"], &["anti-aging cream", "serum"]),
            ],
        ),
        category(
            "electronics",
            "Electronics",
            &[
                "electronic", "headphone", "smartphone", "laptop", "speaker", "earbuds",
                "charger", "camera", "tablet", "bluetooth", "wireless", "gadget", "console",
            ],
            vec![
                competitor("apple", "Apple", "https://www.apple.com", &["Apple"], &["iPhone", "AirPods", "MacBook"]),
                competitor("samsung", "Samsung", "https://www.samsung.com", &["Samsung", "Samsung Galaxy"], &["smartphone", "earbuds", "tablet"]),
                competitor("sony", "Sony", "https://www.sony.com", &["Sony"], &["headphones", "camera", "speaker"]),
                competitor("anker", "Anker", "https://www.anker.com", &["Anker"], &["charger", "power bank", "earbuds"]),
            ],
        ),
        category(
            "jewelry",
            "Jewelry & Accessories",
            &[
                "jewelry", "necklace", "bracelet", "earring", "pendant", "ring", "watch",
                "handbag", "sunglasses", "wallet", "gold", "silver", "diamond",
            ],
            vec![
                competitor("pandora", "Pandora", "https://www.pandora.net", &["Pandora"], &["charm bracelet", "necklace", "rings"]),
                competitor("tiffany", "Tiffany & Co.", "https://www.tiffany.com", &["Tiffany", "Tiffany & Co"], &["engagement ring", "necklace"]),
                competitor("fossil", "Fossil", "https://www.fossil.com", &["Fossil"], &["watch", "leather wallet"]),
                competitor("michael_kors", "Michael Kors", "https://www.michaelkors.com", &["Michael Kors"], &["handbag", "watch"]),
            ],
        ),
        category(
            "home_kitchen",
            "Home & Kitchen",
            &[
                "kitchen", "cookware", "blender", "cutlery", "appliance", "coffee maker",
                "saucepan", "teapot", "knife", "utensil", "mixer", "air fryer", "bakeware",
            ],
            vec![
                competitor("kitchenaid", "KitchenAid", "https://www.kitchenaid.com", &["KitchenAid"], &["stand mixer", "blender"]),
                competitor("ninja", "Ninja", "https://www.ninjakitchen.com", &["Ninja Kitchen", "Ninja"], &["air fryer", "blender"]),
                competitor("cuisinart", "Cuisinart", "https://www.cuisinart.com", &["Cuisinart"], &["coffee maker", "cookware set"]),
                competitor("oxo", "OXO", "https://www.oxo.com", &["OXO"], &["kitchen utensils", "food storage"]),
            ],
        ),
        category(
            "fitness",
            "Fitness Equipment",
            &[
                "fitness", "workout", "gym", "dumbbell", "yoga", "treadmill", "kettlebell",
                "resistance band", "exercise", "weights", "training", "barbell", "protein",
            ],
            vec![
                competitor("peloton", "Peloton", "https://www.onepeloton.com", &["Peloton"], &["exercise bike", "treadmill"]),
                competitor("bowflex", "Bowflex", "https://www.bowflex.com", &["Bowflex"], &["adjustable dumbbells", "home gym"]),
                competitor("gaiam", "Gaiam", "https://www.gaiam.com", &["Gaiam"], &["yoga mat", "yoga blocks"]),
                competitor("nordictrack", "NordicTrack", "https://www.nordictrack.com", &["NordicTrack"], &["treadmill", "elliptical"]),
            ],
        ),
        category(
            "beverages",
            "Beverages",
            &[
                "beverage", "drink", "soda", "coffee", "juice", "energy drink", "tea", "water",
                "smoothie", "sparkling", "bottle", "canned", "brew",
            ],
            vec![
                competitor("coca_cola", "Coca-Cola", "https://www.coca-cola.com", &["Coca-Cola", "Coke"], &["soda", "zero sugar"]),
                competitor("pepsico", "PepsiCo", "https://www.pepsico.com", &["Pepsi"], &["cola", "sparkling water"]),
                competitor("red_bull", "Red Bull", "https://www.redbull.com", &["Red Bull"], &["energy drink", "sugarfree"]),
                competitor("celsius", "Celsius", "https://www.celsius.com", &["Celsius"], &["energy drink", "fitness drink"]),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn first_category_is_default() {
        assert_eq!(default_category().id, catalog()[0].id);
        assert_eq!(default_category().name, "Shoes");
    }

    #[test]
    fn ids_are_unique_and_have_context_terms() {
        let mut seen = HashSet::new();
        for category in catalog() {
            assert!(seen.insert(category.id.as_str()), "duplicate id {}", category.id);
            assert!(!context_terms(&category.id).is_empty());
            assert!(category.keywords.len() >= 5);
        }
    }

    #[test]
    fn every_competitor_can_form_a_query() {
        for category in catalog() {
            assert!(!category.competitors.is_empty());
            for c in &category.competitors {
                assert!(!c.search_terms.is_empty(), "{} has no search terms", c.id);
                assert!(!c.product_types.is_empty(), "{} has no product types", c.id);
            }
        }
    }

    #[test]
    fn keywords_are_lowercase() {
        for category in catalog() {
            for k in &category.keywords {
                assert_eq!(k, &k.to_lowercase());
            }
        }
    }

    #[test]
    fn find_category_by_id() {
        assert_eq!(find_category("skincare").map(|c| c.name.as_str()), Some("Skincare Products"));
        assert!(find_category("furniture").is_none());
    }
}
