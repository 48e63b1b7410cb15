//! Built-in mod catalog
//!
//! The full universe of known affix descriptions per category. Reward-type
//! mods start flagged desired; hazard and guard mods start neutral so the
//! user opts into vetoing them.

use boxroll_core::Category;

use crate::ModDefinition;

fn desired(name: &str, description: &str, category: Category) -> ModDefinition {
    ModDefinition {
        name: name.to_string(),
        description: description.to_string(),
        category,
        is_desired: true,
        is_undesired: false,
    }
}

fn neutral(name: &str, description: &str, category: Category) -> ModDefinition {
    ModDefinition {
        name: name.to_string(),
        description: description.to_string(),
        category,
        is_desired: false,
        is_undesired: false,
    }
}

/// Every category shares the same hazard/guard mod pool
fn hazards(prefix: &str, category: Category) -> Vec<ModDefinition> {
    vec![
        neutral(&format!("{prefix}_freezes"), "Freezes you when activated", category),
        neutral(&format!("{prefix}_explodes"), "Explodes", category),
        neutral(&format!("{prefix}_caustic"), "Spreads Caustic Ground", category),
        neutral(&format!("{prefix}_lightning"), "Casts Lightning Storm", category),
        neutral(&format!("{prefix}_firestorm"), "Casts Firestorm", category),
        neutral(&format!("{prefix}_ignites"), "Ignites you when activated", category),
        neutral(
            &format!("{prefix}_curse"),
            "Casts a random Hex Curse Spell when activated",
            category,
        ),
        neutral(&format!("{prefix}_stream"), "Guarded by a stream of Monsters", category),
        neutral(&format!("{prefix}_skeletons"), "Summons Skeletons", category),
        neutral(&format!("{prefix}_ice_nova"), "Casts Ice Nova", category),
        neutral(&format!("{prefix}_rare_monsters"), "Guarded by 3 Rare Monsters", category),
        neutral(
            &format!("{prefix}_magic_monsters"),
            "Guarded by a pack of Magic Monsters",
            category,
        ),
        neutral(&format!("{prefix}_exile"), "Guarded by a Rogue Exile", category),
        neutral(&format!("{prefix}_corpses"), "Detonates nearby corpses", category),
        neutral(
            &format!("{prefix}_revives"),
            "Revives nearby dead Monsters with Onslaught",
            category,
        ),
    ]
}

/// The default mod catalog, in definition order
pub fn default_mods() -> Vec<ModDefinition> {
    let mut mods = Vec::new();

    // Arcanist
    mods.push(desired(
        "arcanist_quantity",
        "increased Quantity of Contained Items",
        Category::Arcanist,
    ));
    mods.push(desired("arcanist_additional_items", "additional Items", Category::Arcanist));
    mods.push(desired("arcanist_chest_level", "+1 Chest level", Category::Arcanist));
    mods.extend(hazards("arcanist", Category::Arcanist));

    // Diviner
    mods.push(desired("diviner_additional_items", "additional Items", Category::Diviner));
    mods.push(desired("diviner_chest_level", "+1 Chest level", Category::Diviner));
    mods.push(desired(
        "diviner_quantity",
        "increased Quantity of Contained Items",
        Category::Diviner,
    ));
    mods.push(desired(
        "diviner_corrupted",
        "additional Divination Cards that give Corrupted Items",
        Category::Diviner,
    ));
    mods.push(desired(
        "diviner_currency",
        "additional Divination Cards that give Currency",
        Category::Diviner,
    ));
    mods.push(desired(
        "diviner_unique",
        "additional Divination Cards that give Unique Items",
        Category::Diviner,
    ));
    mods.extend(hazards("diviner", Category::Diviner));

    // Cartographer
    mods.push(desired(
        "cartographer_map_currency",
        "additional Map Currency Items",
        Category::Cartographer,
    ));
    mods.push(desired("cartographer_unique", "additional Unique Item", Category::Cartographer));
    mods.push(desired(
        "cartographer_rarity",
        "more Rarity of Contained Items",
        Category::Cartographer,
    ));
    mods.push(desired(
        "cartographer_quantity",
        "increased Quantity of Contained Items",
        Category::Cartographer,
    ));
    mods.push(desired(
        "cartographer_identified",
        "Contains Identified Items",
        Category::Cartographer,
    ));
    mods.push(desired(
        "cartographer_additional_item",
        "additional Item",
        Category::Cartographer,
    ));
    mods.push(desired(
        "cartographer_magic_item",
        "additional Magic Item",
        Category::Cartographer,
    ));
    mods.push(desired("cartographer_rare_item", "additional Rare Item", Category::Cartographer));
    mods.push(desired("cartographer_quality", "Quality", Category::Cartographer));
    mods.push(desired("cartographer_chest_level", "+1 Chest level", Category::Cartographer));
    mods.extend(hazards("cartographer", Category::Cartographer));

    // Regular
    mods.push(desired("regular_additional_items", "additional Items", Category::Regular));
    mods.push(desired("regular_chest_level", "+1 Chest level", Category::Regular));
    mods.push(desired(
        "regular_quantity",
        "increased Quantity of Contained Items",
        Category::Regular,
    ));
    mods.push(desired("regular_rare_items", "additional Rare Items", Category::Regular));
    mods.push(desired("regular_sockets", "additional Sockets", Category::Regular));
    mods.push(desired("regular_magic_items", "additional Magic Items", Category::Regular));
    mods.push(desired("regular_mirrored", "Mirrored Items", Category::Regular));
    mods.push(desired("regular_quality", "Quality", Category::Regular));
    mods.push(desired("regular_unique", "additional Unique Item", Category::Regular));
    mods.push(desired("regular_rarity", "more Rarity of Contained Items", Category::Regular));
    mods.push(desired("regular_linked", "fully Linked", Category::Regular));
    mods.push(desired("regular_identified", "Identified Items", Category::Regular));
    mods.push(desired("regular_scarabs", "additional Scarabs", Category::Regular));
    mods.extend(hazards("regular", Category::Regular));

    mods
}
