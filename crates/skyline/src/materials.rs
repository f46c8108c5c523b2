//! Trim material palette handed to the tower generator.

use procgen::MaterialResolver;

/// Number of building trim materials shipped with the default palette.
pub const TRIM_MATERIAL_COUNT: u32 = 6;

/// Named material slots. Selectors index into the list.
#[derive(Debug, Clone)]
pub struct MaterialPalette {
    names: Vec<String>,
}

impl Default for MaterialPalette {
    fn default() -> Self {
        Self {
            names: (0..TRIM_MATERIAL_COUNT)
                .map(|i| format!("MAT_BUILD_TRIM_{}", i))
                .collect(),
        }
    }
}

impl MaterialPalette {
    pub fn name(&self, selector: u32) -> Option<&str> {
        self.names.get(selector as usize).map(String::as_str)
    }
}

impl MaterialResolver for MaterialPalette {
    type Handle = u32;

    fn material_count(&self) -> u32 {
        self.names.len() as u32
    }

    /// Out-of-range selectors wrap around the palette.
    fn resolve(&self, selector: u32) -> u32 {
        selector % self.material_count().max(1)
    }
}
