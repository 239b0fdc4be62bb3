//! Engine configuration.
//!
//! A nested engine rendering a sub-form inherits the whole configuration of its parent.

use reflectgrid_core::NamingStrategy;

use crate::layout::LayoutStrategy;

/// Rendering configuration of one engine instance.
#[derive(Debug, Clone)]
pub struct GridConfig {
    /// Placement strategy for the next render pass
    pub layout: LayoutStrategy,
    /// Maximum width applied to every control
    pub width_limit: f64,
    /// Horizontal gap between grid columns
    pub hgap: f64,
    /// Vertical gap between grid rows
    pub vgap: f64,
    /// Padding around the grid
    pub padding: f64,
    /// Label text for fields
    pub field_naming: NamingStrategy,
    /// Label text for actions
    pub method_naming: NamingStrategy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            layout: LayoutStrategy::Paired,
            width_limit: 300.0,
            hgap: 5.0,
            vgap: 5.0,
            padding: 10.0,
            field_naming: NamingStrategy::SplitToCapitalizedWords,
            method_naming: NamingStrategy::SplitToCapitalizedWords,
        }
    }
}

impl GridConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout strategy
    pub fn with_layout(mut self, layout: LayoutStrategy) -> Self {
        self.layout = layout;
        self
    }

    /// Set the maximum control width
    pub fn with_width_limit(mut self, width: f64) -> Self {
        self.width_limit = width;
        self
    }

    /// Set the grid gaps
    pub fn with_gaps(mut self, hgap: f64, vgap: f64) -> Self {
        self.hgap = hgap;
        self.vgap = vgap;
        self
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Set the naming strategy for field labels
    pub fn with_field_naming(mut self, naming: NamingStrategy) -> Self {
        self.field_naming = naming;
        self
    }

    /// Set the naming strategy for action labels
    pub fn with_method_naming(mut self, naming: NamingStrategy) -> Self {
        self.method_naming = naming;
        self
    }
}
