// Color palettes

use serde::Deserialize;

/// An ordered, cycling list of color tokens.
///
/// Colors are picked by position only (`index mod len`), never by value, so
/// the same row or series index always gets the same color.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ColorPalette {
    colors: Vec<String>,
}

impl ColorPalette {
    /// Build a palette from explicit tokens. An empty list falls back to the
    /// default palette so `color_at` always has something to return.
    pub fn new<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let colors: Vec<String> = colors.into_iter().map(Into::into).collect();
        if colors.is_empty() {
            Self::category10()
        } else {
            Self { colors }
        }
    }

    /// d3 "category10"
    pub fn category10() -> Self {
        Self::from_static(&[
            "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
            "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
        ])
    }

    /// The muted dashboard palette used for query result cards
    pub fn dashboard() -> Self {
        Self::from_static(&[
            "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884D8",
            "#82CA9D", "#FFC658", "#FF6B6B", "#4ECDC4", "#45B7D1",
        ])
    }

    fn from_static(colors: &[&str]) -> Self {
        Self {
            colors: colors.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }

    pub fn color_at(&self, index: usize) -> &str {
        if self.colors.is_empty() {
            return "#000000";
        }
        &self.colors[index % self.colors.len()]
    }

    /// Assign colors to keys in the order given
    pub fn assign_colors<'a>(&self, keys: &'a [String]) -> Vec<(&'a str, String)> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| (k.as_str(), self.color_at(i).to_string()))
            .collect()
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::dashboard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_cycles() {
        let palette = ColorPalette::new(["red", "green"]);
        assert_eq!(palette.color_at(0), "red");
        assert_eq!(palette.color_at(1), "green");
        assert_eq!(palette.color_at(2), "red");
        assert_eq!(palette.color_at(5), "green");
    }

    #[test]
    fn test_empty_palette_falls_back() {
        let palette = ColorPalette::new(Vec::<String>::new());
        assert_eq!(palette, ColorPalette::category10());
    }

    #[test]
    fn test_assign_colors_by_position() {
        let palette = ColorPalette::new(["a", "b"]);
        let keys = vec!["q1".to_string(), "q2".to_string(), "q3".to_string()];
        let assigned = palette.assign_colors(&keys);
        assert_eq!(assigned[0], ("q1", "a".to_string()));
        assert_eq!(assigned[2], ("q3", "a".to_string()));
    }

    #[test]
    fn test_deserialize_from_list() {
        let palette: ColorPalette = serde_json::from_str(r##"["#111", "#222"]"##).unwrap();
        assert_eq!(palette.len(), 2);
        assert_eq!(palette.color_at(3), "#222");
    }
}
