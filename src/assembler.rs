use crate::config::LayoutSpec;
use crate::keys::{layer_name_for_view, view_c_identifier};
use crate::layout::{LayoutId, RawLayout, load_layout};
use crate::scancodes::{FlatScancodes, UniqueScancodes, flatten};
use crate::source::LayoutSource;
use crate::view::{TopRow, TransformedView, ViewOptions, transform};
use anyhow::{Result, bail};
use colored::Colorize;
use log::{debug, info, warn};

/// Options shared by every layout of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct TransformOptions {
    pub extra_top_row_base: Option<String>,
    pub extra_top_row_upper: Option<String>,
    pub arrows_around_space: bool,
    pub scancodes: bool,
}

fn configured(row: &Option<String>) -> Option<&str> {
    row.as_deref().filter(|row| !row.trim().is_empty())
}

impl TransformOptions {
    /// Extra row for `view_id`. Views without their own row get a hidden
    /// placeholder as wide as the widest configured row, so all layers of a
    /// layout keep the same number of rows.
    pub fn top_row(&self, view_id: &str) -> Option<TopRow> {
        let own = match view_id {
            "base" => configured(&self.extra_top_row_base),
            "upper" => configured(&self.extra_top_row_upper),
            _ => None,
        };
        if let Some(row) = own {
            return Some(TopRow::Keys(row.to_owned()));
        }

        [&self.extra_top_row_base, &self.extra_top_row_upper]
            .into_iter()
            .filter_map(configured)
            .map(|row| row.split_whitespace().count())
            .max()
            .map(TopRow::Placeholder)
    }

    fn view_options(&self, view_id: &str) -> ViewOptions {
        ViewOptions {
            top_row: self.top_row(view_id),
            arrows_around_space: self.arrows_around_space,
            scancodes: self.scancodes,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Layer {
    pub view: TransformedView,
    pub name: &'static str,
    /// e.g. `lower_terminal_us`
    pub c_identifier: String,
    /// Ordinal of the destination layer per switcher key
    pub switcher_dests: Vec<usize>,
    pub scancodes: Option<FlatScancodes>,
}

impl Layer {
    pub fn switcher_idxs(&self) -> Vec<usize> {
        self.view.switchers.iter().map(|edge| edge.index).collect()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub id: LayoutId,
    pub name: String,
    pub layers: Vec<Layer>,
}

impl Layout {
    pub fn short_name(&self) -> &str {
        &self.id.id
    }
}

/// Transform every known view of a layout, in definition order, and resolve
/// switch destinations to layer ordinals.
pub(crate) fn assemble(
    id: LayoutId,
    name: &str,
    raw: &RawLayout,
    options: &TransformOptions,
) -> Result<Layout> {
    info!("{} {} ({})", "LAYOUT".purple(), name.bright_blue(), id.id);

    let view_ids: Vec<&str> = raw
        .views
        .keys()
        .map(String::as_str)
        .filter(|view_id| layer_name_for_view(view_id).is_some())
        .collect();

    let mut layers = Vec::with_capacity(view_ids.len());
    for (view_id, rows) in &raw.views {
        let Some(layer_name) = layer_name_for_view(view_id) else {
            warn!("Ignoring unknown view_id {view_id}");
            continue;
        };

        let view = transform(view_id, rows, &raw.buttons, &options.view_options(view_id));

        let mut switcher_dests = Vec::with_capacity(view.switchers.len());
        for edge in &view.switchers {
            match view_ids.iter().position(|known| *known == edge.destination) {
                Some(ordinal) => switcher_dests.push(ordinal),
                None => bail!(
                    "Unhandled layer switch destination {} in view {view_id} of {}",
                    edge.destination,
                    id.id
                ),
            }
        }

        let scancodes = options.scancodes.then(|| flatten(&view.scancodes()));

        info!("{} {} ({layer_name})", "LAYER".purple(), view_id.bright_blue());
        debug!(
            "{view_id}: {} keys, {} modifiers, {} switchers",
            view.num_keys(),
            view.modifier_idxs.len(),
            view.switchers.len()
        );

        layers.push(Layer {
            c_identifier: format!("{}_{}", view_c_identifier(view_id), id.c_identifier),
            name: layer_name,
            view,
            switcher_dests,
            scancodes,
        });
    }

    Ok(Layout {
        id,
        name: name.to_owned(),
        layers,
    })
}

/// Everything produced by one run, in input order
#[derive(Debug, Default)]
pub(crate) struct Run {
    pub layouts: Vec<Layout>,
    pub unique_scancodes: UniqueScancodes,
    pub scancodes: bool,
}

impl Run {
    pub fn push(&mut self, layout: Layout) {
        for layer in &layout.layers {
            if let Some(scancodes) = &layer.scancodes {
                self.unique_scancodes.extend(&scancodes.codes);
            }
        }
        self.layouts.push(layout);
    }
}

/// Load and assemble every requested layout, one after another.
pub(crate) fn run(
    source: &dyn LayoutSource,
    specs: &[LayoutSpec],
    options: &TransformOptions,
) -> Result<Run> {
    let mut run = Run {
        scancodes: options.scancodes,
        ..Default::default()
    };

    for spec in specs {
        let raw = load_layout(source, &spec.input)?;
        let layout = assemble(LayoutId::from_input(&spec.input), &spec.name, &raw, options)?;
        run.push(layout);
    }

    Ok(run)
}
