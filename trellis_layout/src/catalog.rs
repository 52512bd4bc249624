// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The property catalog shared by every node of a tree.

use kurbo::Insets;
use peniko::Color;
use peniko::color::palette::css;
use trellis_property::{
    Affects, Property, PropertyError, PropertyMetadata, PropertyMetadataBuilder, PropertyRegistry,
    PropertyValue,
};

use crate::context::DataContext;
use crate::grid::GridLength;
use crate::types::{BASE_OWNER, NodeKind, Orientation};

/// Handles to the properties every tree understands.
#[derive(Copy, Clone, Debug)]
pub struct LayoutProperties {
    /// `Layout.DataContext`: the model bindings read from.
    pub data_context: Property<Option<DataContext>>,
    /// `Layout.Background`: fill behind the node.
    pub background: Property<Color>,
    /// `Layout.Width`: explicit width, overriding the measured one.
    pub width: Property<Option<f64>>,
    /// `Layout.Height`: explicit height, overriding the measured one.
    pub height: Property<Option<f64>>,
    /// `Border.Padding`: space between the border and the child.
    pub padding: Property<Insets>,
    /// `Border.BorderThickness`: uniform outline width.
    pub border_thickness: Property<f64>,
    /// `Border.BorderBrush`: outline color.
    pub border_brush: Property<Color>,
    /// `Border.CornerRadius`: outline corner radius.
    pub corner_radius: Property<f64>,
    /// `Grid.RowDefinitions`.
    pub row_definitions: Property<Vec<GridLength>>,
    /// `Grid.ColumnDefinitions`.
    pub column_definitions: Property<Vec<GridLength>>,
    /// `Grid.Row`: attached to a grid's children.
    pub row: Property<usize>,
    /// `Grid.Column`: attached to a grid's children.
    pub column: Property<usize>,
    /// `StackPanel.Orientation`.
    pub orientation: Property<Orientation>,
    /// `TextBlock.Text`.
    pub text: Property<String>,
    /// `TextBlock.Foreground`.
    pub foreground: Property<Color>,
    /// `Placeholder.TemplateName`.
    pub template_name: Property<String>,
}

impl LayoutProperties {
    fn register(registry: &mut PropertyRegistry) -> Result<Self, PropertyError> {
        let layout = Affects::LAYOUT | Affects::RENDER;
        let non_negative = |v: f64| if v.is_nan() { 0.0 } else { v.max(0.0) };
        Ok(Self {
            data_context: registry.register(BASE_OWNER, "DataContext", PropertyMetadata::new(None))?,
            background: registry.register(
                BASE_OWNER,
                "Background",
                render_only(css::TRANSPARENT),
            )?,
            width: registry.register(BASE_OWNER, "Width", explicit_size(layout))?,
            height: registry.register(BASE_OWNER, "Height", explicit_size(layout))?,
            padding: registry.register(
                NodeKind::Border.name(),
                "Padding",
                affecting(Insets::ZERO, layout),
            )?,
            border_thickness: registry.register(
                NodeKind::Border.name(),
                "BorderThickness",
                PropertyMetadataBuilder::new(0.0)
                    .affects(layout)
                    .coerce(non_negative)
                    .build(),
            )?,
            border_brush: registry.register(
                NodeKind::Border.name(),
                "BorderBrush",
                render_only(css::TRANSPARENT),
            )?,
            corner_radius: registry.register(
                NodeKind::Border.name(),
                "CornerRadius",
                PropertyMetadataBuilder::new(0.0)
                    .affects(Affects::RENDER)
                    .coerce(non_negative)
                    .build(),
            )?,
            row_definitions: registry.register(
                NodeKind::Grid.name(),
                "RowDefinitions",
                affecting(Vec::new(), layout),
            )?,
            column_definitions: registry.register(
                NodeKind::Grid.name(),
                "ColumnDefinitions",
                affecting(Vec::new(), layout),
            )?,
            row: registry.register(NodeKind::Grid.name(), "Row", affecting(0, layout))?,
            column: registry.register(NodeKind::Grid.name(), "Column", affecting(0, layout))?,
            orientation: registry.register(
                NodeKind::StackPanel.name(),
                "Orientation",
                affecting(Orientation::Vertical, layout),
            )?,
            text: registry.register(
                NodeKind::TextBlock.name(),
                "Text",
                affecting(String::new(), layout),
            )?,
            foreground: registry.register(
                NodeKind::TextBlock.name(),
                "Foreground",
                render_only(css::BLACK),
            )?,
            template_name: registry.register(
                NodeKind::Placeholder.name(),
                "TemplateName",
                PropertyMetadata::new(String::new()),
            )?,
        })
    }
}

fn affecting<T: PropertyValue>(default: T, affects: Affects) -> PropertyMetadata<T> {
    PropertyMetadataBuilder::new(default).affects(affects).build()
}

/// `None` unless a usable length. NaN never equals itself, so it would also
/// defeat the equal-value checks on publish.
fn explicit_size(affects: Affects) -> PropertyMetadata<Option<f64>> {
    PropertyMetadataBuilder::new(None)
        .affects(affects)
        .coerce(|v: Option<f64>| v.filter(|x| !x.is_nan()).map(|x| x.max(0.0)))
        .build()
}

fn render_only<T: PropertyValue>(default: T) -> PropertyMetadata<T> {
    affecting(default, Affects::RENDER)
}

/// The property registry plus the standard property handles.
///
/// A catalog is built once by the application root and shared by every tree
/// through an `Rc`. After [`CatalogBuilder::build`] it is read-only.
///
/// ```rust
/// use trellis_layout::Catalog;
///
/// let catalog = Catalog::new().unwrap();
/// let text = catalog.registry().lookup("TextBlock", "Text").unwrap();
/// assert_eq!(text, catalog.props().text.id());
/// ```
#[derive(Debug)]
pub struct Catalog {
    registry: PropertyRegistry,
    props: LayoutProperties,
}

impl Catalog {
    /// A catalog with only the standard properties.
    ///
    /// # Errors
    ///
    /// Propagates registration failures; none occur for the standard set.
    pub fn new() -> Result<Self, PropertyError> {
        Ok(CatalogBuilder::new()?.build())
    }

    /// Starts a catalog that the application can extend with its own properties.
    ///
    /// # Errors
    ///
    /// Same as [`Catalog::new`].
    pub fn builder() -> Result<CatalogBuilder, PropertyError> {
        CatalogBuilder::new()
    }

    /// The underlying registry.
    #[must_use]
    pub fn registry(&self) -> &PropertyRegistry {
        &self.registry
    }

    /// The standard property handles.
    #[must_use]
    pub fn props(&self) -> &LayoutProperties {
        &self.props
    }
}

/// Builder for a [`Catalog`] with application-defined properties.
#[derive(Debug)]
pub struct CatalogBuilder {
    registry: PropertyRegistry,
    props: LayoutProperties,
}

impl CatalogBuilder {
    fn new() -> Result<Self, PropertyError> {
        let mut registry = PropertyRegistry::new();
        let props = LayoutProperties::register(&mut registry)?;
        Ok(Self { registry, props })
    }

    /// Registers an extra property under `owner`.
    ///
    /// Use a [`NodeKind`] name to make it visible by name on that kind, or
    /// [`BASE_OWNER`] for every kind.
    ///
    /// # Errors
    ///
    /// [`PropertyError::AlreadyRegistered`] on a duplicate `(owner, name)`.
    pub fn register<T: PropertyValue>(
        &mut self,
        owner: &'static str,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Result<Property<T>, PropertyError> {
        self.registry.register(owner, name, metadata)
    }

    /// Freezes the catalog.
    #[must_use]
    pub fn build(self) -> Catalog {
        Catalog {
            registry: self.registry,
            props: self.props,
        }
    }
}
