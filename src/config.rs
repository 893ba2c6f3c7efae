use serde::Deserialize;

const WIDTH_DEFAULT: f32 = 960.0;
const HEIGHT_DEFAULT: f32 = 640.0;
const BACKGROUND_DEFAULT: &str = "white";
const NODE_RADIUS_DEFAULT: f32 = 16.0;

/// Settings used when serializing a scene to SVG.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
    pub node_radius: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width: WIDTH_DEFAULT,
            height: HEIGHT_DEFAULT,
            background: BACKGROUND_DEFAULT.to_string(),
            node_radius: NODE_RADIUS_DEFAULT,
        }
    }
}

impl SceneConfig {
    /// Overlays `OXGRAPH_*` environment variables on top of `self`.
    pub fn with_env(self) -> Self {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(width) = lookup("OXGRAPH_WIDTH").and_then(|v| v.parse().ok()) {
            self.width = width;
        }
        if let Some(height) = lookup("OXGRAPH_HEIGHT").and_then(|v| v.parse().ok()) {
            self.height = height;
        }
        if let Some(background) = lookup("OXGRAPH_BACKGROUND").filter(|v| !v.trim().is_empty()) {
            self.background = background;
        }
        if let Some(radius) = lookup("OXGRAPH_NODE_RADIUS").and_then(|v| v.parse().ok()) {
            self.node_radius = radius;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: SceneConfig = serde_json::from_str(r#"{ "background": "black" }"#).unwrap();
        assert_eq!(config.background, "black");
        assert_eq!(config.width, WIDTH_DEFAULT);
        assert_eq!(config.node_radius, NODE_RADIUS_DEFAULT);
    }

    #[test]
    fn environment_overrides_ignore_unparsable_values() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("OXGRAPH_WIDTH", "1200"),
            ("OXGRAPH_HEIGHT", "tall"),
            ("OXGRAPH_BACKGROUND", "#111"),
        ]);
        let config = SceneConfig::default()
            .with_lookup(|key| vars.get(key).map(|value| value.to_string()));

        assert_eq!(config.width, 1200.0);
        assert_eq!(config.height, HEIGHT_DEFAULT);
        assert_eq!(config.background, "#111");
    }
}
