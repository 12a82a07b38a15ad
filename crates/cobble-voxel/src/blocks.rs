//! The built-in block and item table.
//!
//! Drops, drop ratios, breakability, and orientations are kept in side tables
//! keyed by name and folded into [`BlockType`] records by [`builtin_defs`].

use rustc_hash::FxHashMap;

use crate::face::Face;
use crate::registry::{BlockType, Orientation, RegistryError, Slot};

const BLOCKS: &[(u8, &str)] = &[
    (0, "air"),
    (1, "stone"),
    (2, "grass"),
    (3, "dirt"),
    (4, "cobblestone"),
    (5, "wood"),
    (6, "sapling"),
    (7, "bedrock"),
    (8, "water"),
    (9, "spring"),
    (10, "lava"),
    (11, "lava-spring"),
    (12, "sand"),
    (13, "gravel"),
    (14, "gold-ore"),
    (15, "iron-ore"),
    (16, "coal-ore"),
    (17, "log"),
    (18, "leaves"),
    (19, "sponge"),
    (20, "glass"),
    (21, "lapis-lazuli-ore"),
    (22, "lapis-lazuli-block"),
    (23, "dispenser"),
    (24, "sandstone"),
    (25, "note-block"),
    (35, "wool"),
    (37, "flower"),
    (38, "rose"),
    (39, "brown-mushroom"),
    (40, "red-mushroom"),
    (41, "gold"),
    (42, "iron"),
    (43, "double-stone-slab"),
    (44, "single-stone-slab"),
    (45, "brick"),
    (46, "tnt"),
    (47, "bookshelf"),
    (48, "mossy-cobblestone"),
    (49, "obsidian"),
    (50, "torch"),
    (51, "fire"),
    (52, "mob-spawner"),
    (53, "wooden-stairs"),
    (54, "chest"),
    (55, "redstone-wire"),
    (56, "diamond-ore"),
    (57, "diamond-block"),
    (58, "workbench"),
    (59, "crops"),
    (60, "soil"),
    (61, "furnace"),
    (62, "burning-furnace"),
    (63, "signpost"),
    (64, "wooden-door-block"),
    (65, "ladder"),
    (66, "tracks"),
    (67, "stone-stairs"),
    (68, "wall-sign"),
    (69, "lever"),
    (70, "stone-plate"),
    (71, "iron-door-block"),
    (72, "wooden-plate"),
    (73, "redstone-ore"),
    (74, "glowing-redstone-ore"),
    (75, "redstone-torch-off"),
    (76, "redstone-torch"),
    (77, "stone-button"),
    (78, "snow"),
    (79, "ice"),
    (80, "snow-block"),
    (81, "cactus"),
    (82, "clay"),
    (83, "reed"),
    (84, "jukebox"),
    (85, "fence"),
    (86, "pumpkin"),
    (87, "brimstone"),
    (88, "slow-sand"),
    (89, "lightstone"),
    (90, "portal"),
    (91, "jack-o-lantern"),
    (92, "cake-block"),
];

const ITEMS: &[(u16, &str)] = &[
    (256, "iron-shovel"),
    (257, "iron-pickaxe"),
    (258, "iron-axe"),
    (259, "flint-and-steel"),
    (260, "apple"),
    (261, "bow"),
    (262, "arrow"),
    (263, "coal"),
    (264, "diamond"),
    (265, "iron-ingot"),
    (266, "gold-ingot"),
    (267, "iron-sword"),
    (268, "wooden-sword"),
    (269, "wooden-shovel"),
    (270, "wooden-pickaxe"),
    (271, "wooden-axe"),
    (272, "stone-sword"),
    (273, "stone-shovel"),
    (274, "stone-pickaxe"),
    (275, "stone-axe"),
    (276, "diamond-sword"),
    (277, "diamond-shovel"),
    (278, "diamond-pickaxe"),
    (279, "diamond-axe"),
    (280, "stick"),
    (281, "bowl"),
    (282, "mushroom-soup"),
    (283, "gold-sword"),
    (284, "gold-shovel"),
    (285, "gold-pickaxe"),
    (286, "gold-axe"),
    (287, "string"),
    (288, "feather"),
    (289, "sulphur"),
    (290, "wooden-hoe"),
    (291, "stone-hoe"),
    (292, "iron-hoe"),
    (293, "diamond-hoe"),
    (294, "gold-hoe"),
    (295, "seeds"),
    (296, "wheat"),
    (297, "bread"),
    (298, "leather-helmet"),
    (299, "leather-chestplate"),
    (300, "leather-leggings"),
    (301, "leather-boots"),
    (302, "chainmail-helmet"),
    (303, "chainmail-chestplate"),
    (304, "chainmail-leggings"),
    (305, "chainmail-boots"),
    (306, "iron-helmet"),
    (307, "iron-chestplate"),
    (308, "iron-leggings"),
    (309, "iron-boots"),
    (310, "diamond-helmet"),
    (311, "diamond-chestplate"),
    (312, "diamond-leggings"),
    (313, "diamond-boots"),
    (314, "gold-helmet"),
    (315, "gold-chestplate"),
    (316, "gold-leggings"),
    (317, "gold-boots"),
    (318, "flint"),
    (319, "raw-porkchop"),
    (320, "cooked-porkchop"),
    (321, "paintings"),
    (322, "golden-apple"),
    (323, "sign"),
    (324, "wooden-door"),
    (325, "bucket"),
    (326, "water-bucket"),
    (327, "lava-bucket"),
    (328, "mine-cart"),
    (329, "saddle"),
    (330, "iron-door"),
    (331, "redstone"),
    (332, "snowball"),
    (333, "boat"),
    (334, "leather"),
    (335, "milk"),
    (336, "clay-brick"),
    (337, "clay-balls"),
    (338, "sugar-cane"),
    (339, "paper"),
    (340, "book"),
    (341, "slimeball"),
    (342, "storage-minecart"),
    (343, "powered-minecart"),
    (344, "egg"),
    (345, "compass"),
    (346, "fishing-rod"),
    (347, "clock"),
    (348, "glowstone-dust"),
    (349, "raw-fish"),
    (350, "cooked-fish"),
    (351, "dye"),
    (352, "bone"),
    (353, "sugar"),
    (354, "cake"),
    (2256, "gold-music-disc"),
    (2257, "green-music-disc"),
];

/// Blocks that do not drop themselves: `(block, dropped entry, secondary)`.
const DROPS: &[(&str, &str, u16)] = &[
    ("stone", "cobblestone", 0),
    ("grass", "dirt", 0),
    ("water", "air", 0),
    ("spring", "air", 0),
    ("lava", "air", 0),
    ("lava-spring", "air", 0),
    ("leaves", "sapling", 0),
    ("glass", "air", 0),
    ("coal-ore", "coal", 0),
    ("lapis-lazuli-ore", "dye", 4),
    ("double-stone-slab", "single-stone-slab", 0),
    ("fire", "air", 0),
    ("mob-spawner", "air", 0),
    ("redstone-wire", "redstone", 0),
    ("diamond-ore", "diamond", 0),
    ("crops", "seeds", 0),
    ("soil", "dirt", 0),
    ("burning-furnace", "furnace", 0),
    ("signpost", "sign", 0),
    ("wooden-door-block", "wooden-door", 0),
    ("wall-sign", "sign", 0),
    ("iron-door-block", "iron-door", 0),
    ("redstone-ore", "redstone", 0),
    ("glowing-redstone-ore", "redstone", 0),
    ("redstone-torch-off", "redstone-torch", 0),
    ("snow", "snowball", 0),
    ("ice", "air", 0),
    ("clay", "clay-balls", 0),
    ("reed", "sugar-cane", 0),
    ("lightstone", "glowstone-dust", 0),
    ("portal", "air", 0),
    ("cake-block", "air", 0),
];

/// Blocks whose drop is not guaranteed.
const RATIOS: &[(&str, f64)] = &[("leaves", 1.0 / 9.0)];

const UNBREAKABLE: &[&str] = &["bedrock"];

/// Wall-mounted and front-facing blocks.
const FACING_WALL: &[(Face, u8)] = &[
    (Face::NegZ, 0x2),
    (Face::PosZ, 0x3),
    (Face::NegX, 0x4),
    (Face::PosX, 0x5),
];

const FACING_TORCH: &[(Face, u8)] = &[
    (Face::PosX, 0x1),
    (Face::NegX, 0x2),
    (Face::PosZ, 0x3),
    (Face::NegZ, 0x4),
    (Face::PosY, 0x5),
];

const FACING_STAIRS: &[(Face, u8)] = &[
    (Face::PosX, 0x0),
    (Face::NegX, 0x1),
    (Face::PosZ, 0x2),
    (Face::NegZ, 0x3),
];

const ORIENTATIONS: &[(&str, &[(Face, u8)])] = &[
    ("ladder", FACING_WALL),
    ("wall-sign", FACING_WALL),
    ("furnace", FACING_WALL),
    ("burning-furnace", FACING_WALL),
    ("dispenser", FACING_WALL),
    ("torch", FACING_TORCH),
    ("redstone-torch", FACING_TORCH),
    ("redstone-torch-off", FACING_TORCH),
    ("wooden-stairs", FACING_STAIRS),
    ("stone-stairs", FACING_STAIRS),
];

/// Assembles the built-in definitions.
///
/// # Errors
///
/// [`RegistryError::UnknownName`] if a side table names an undefined entry.
pub fn builtin_defs() -> Result<Vec<BlockType>, RegistryError> {
    let mut defs: Vec<BlockType> = BLOCKS
        .iter()
        .map(|&(id, name)| BlockType::block(id, name))
        .chain(ITEMS.iter().map(|&(id, name)| BlockType::item(id, name)))
        .collect();

    let updates = {
        let index: FxHashMap<&str, usize> = defs
            .iter()
            .enumerate()
            .map(|(i, def)| (def.name.as_str(), i))
            .collect();
        let position = |name: &str| {
            index
                .get(name)
                .copied()
                .ok_or_else(|| RegistryError::UnknownName(name.to_string()))
        };

        let mut updates = Vec::new();
        for &(name, dropped, secondary) in DROPS {
            let target = defs[position(dropped)?].id();
            updates.push((position(name)?, Update::Drop(Slot::new(target, secondary))));
        }
        for &(name, ratio) in RATIOS {
            updates.push((position(name)?, Update::Ratio(ratio)));
        }
        for &name in UNBREAKABLE {
            updates.push((position(name)?, Update::Unbreakable));
        }
        for &(name, pairs) in ORIENTATIONS {
            updates.push((position(name)?, Update::Orientation(Orientation::from_pairs(pairs))));
        }
        updates
    };

    for (i, update) in updates {
        let def = &mut defs[i];
        match update {
            Update::Drop(slot) => def.drop = slot,
            Update::Ratio(ratio) => def.ratio = ratio,
            Update::Unbreakable => def.breakable = false,
            Update::Orientation(table) => def.orientation = Some(table),
        }
    }
    Ok(defs)
}

/// A side-table adjustment to one definition.
enum Update {
    Drop(Slot),
    Ratio(f64),
    Unbreakable,
    Orientation(Orientation),
}
