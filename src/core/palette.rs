//! Category colours and the onboarding category catalogue.

/// Colours assigned to new categories in order, wrapping around.
pub const CATEGORY_PALETTE: [&str; 12] = [
    "#4A6FFF", "#FF9500", "#34C759", "#AF52DE", "#FF2D55", "#5AC8FA", "#FF3B30", "#FFCC00",
    "#5856D6", "#30B0C7", "#A2845E", "#8E8E93",
];

/// Picks the palette colour for the `existing`-th category a user creates.
pub fn color_for_index(existing: usize) -> &'static str {
    CATEGORY_PALETTE[existing % CATEGORY_PALETTE.len()]
}

/// A suggested category offered during onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryPreset {
    pub name: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

pub const DEFAULT_CATEGORIES: [CategoryPreset; 8] = [
    CategoryPreset { name: "Housing", icon: "🏠", color: "#4A6FFF" },
    CategoryPreset { name: "Food", icon: "🍔", color: "#FF9500" },
    CategoryPreset { name: "Transportation", icon: "🚗", color: "#34C759" },
    CategoryPreset { name: "Entertainment", icon: "🎬", color: "#AF52DE" },
    CategoryPreset { name: "Shopping", icon: "🛍️", color: "#FF2D55" },
    CategoryPreset { name: "Utilities", icon: "💡", color: "#5AC8FA" },
    CategoryPreset { name: "Health", icon: "⚕️", color: "#FF3B30" },
    CategoryPreset { name: "Personal", icon: "👤", color: "#FFCC00" },
];

pub fn preset(name: &str) -> Option<CategoryPreset> {
    DEFAULT_CATEGORIES
        .iter()
        .copied()
        .find(|preset| preset.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_cycles() {
        assert_eq!(color_for_index(0), "#4A6FFF");
        assert_eq!(color_for_index(CATEGORY_PALETTE.len()), "#4A6FFF");
        assert_eq!(color_for_index(13), CATEGORY_PALETTE[1]);
    }

    #[test]
    fn presets_resolve_by_name() {
        let food = preset("food").expect("food preset");
        assert_eq!(food.icon, "🍔");
        assert!(preset("Pets").is_none());
    }
}
