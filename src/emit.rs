use crate::assembler::{Layer, Layout, Run};
use crate::keys::escape;
use anyhow::{Context, Result};
use log::info;
use std::fs;
use std::path::Path;

pub(crate) const OUTFILE_C: &str = "sq2lv_layouts.c";
pub(crate) const OUTFILE_H: &str = "sq2lv_layouts.h";

const LAYER_FIELDS: &[&str] = &[
    "num_keys",
    "keycaps",
    "attributes",
    "num_modifiers",
    "modifier_idxs",
    "num_switchers",
    "switcher_idxs",
    "switcher_dests",
];
const SCANCODE_FIELDS: &[&str] = &["num_scancodes", "scancodes", "scancode_idxs", "scancode_nums"];
const LAYOUT_FIELDS: &[&str] = &["name", "short_name", "num_layers", "layers"];

fn comma_if_needed(len: usize, idx: usize) -> &'static str {
    if idx + 1 < len { "," } else { "" }
}

fn quoted(text: &str) -> String {
    format!("\"{}\"", escape(text))
}

/// Line based builder for .c and .h files
struct SourceBuilder {
    lines: Vec<String>,
}

impl SourceBuilder {
    fn new() -> Self {
        let mut builder = Self { lines: Vec::new() };
        builder.lines(["/**", " * Auto-generated with sq2lv", " **/", ""]);
        builder
    }

    fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    fn lines<I, S>(&mut self, lines: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    fn include(&mut self, header: &str) -> &mut Self {
        self.line(format!("#include \"{header}\""))
    }

    fn system_include(&mut self, header: &str) -> &mut Self {
        self.line(format!("#include <{header}>"))
    }

    fn section_comment(&mut self, title: &str) -> &mut Self {
        self.lines(["/**".to_owned(), format!(" * {title}"), " **/".to_owned()])
    }

    fn subsection_comment(&mut self, title: &str) -> &mut Self {
        self.line(format!("/* {title} */"))
    }

    /// Static array with one source line per non-empty row. Arrays without
    /// any element become NULL pointers.
    fn array(
        &mut self,
        ty: &str,
        identifier: &str,
        rows: Vec<Vec<String>>,
        row_terminator: Option<&str>,
        array_terminator: Option<&str>,
    ) -> &mut Self {
        if rows.iter().all(Vec::is_empty) {
            return self.line(format!("static {ty} * const {identifier} = NULL;"));
        }

        let last = rows.len() - 1;
        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .enumerate()
            .map(|(i, mut elements)| {
                let terminator = if i < last {
                    row_terminator
                } else {
                    array_terminator
                };
                if let Some(terminator) = terminator {
                    elements.push(terminator.to_owned());
                }
                elements
            })
            .filter(|elements| !elements.is_empty())
            .collect();

        self.line(format!("static {ty} {identifier}[] = {{ \\"));
        let len = rows.len();
        for (i, elements) in rows.into_iter().enumerate() {
            self.line(format!(
                "    {}{} \\",
                elements.join(", "),
                comma_if_needed(len, i)
            ));
        }
        self.line("};")
    }

    fn flat_array(&mut self, ty: &str, identifier: &str, values: Vec<String>) -> &mut Self {
        self.array(ty, identifier, vec![values], None, None)
    }

    /// Wrap everything after the header comment in an include guard.
    fn wrap_in_ifndef(&mut self, guard: &str) -> &mut Self {
        let idx = self
            .lines
            .iter()
            .take_while(|line| line.starts_with("/*") || line.starts_with(" *"))
            .count();
        self.lines.splice(
            idx..idx,
            [String::new(), format!("#ifndef {guard}"), format!("#define {guard}")],
        );
        self.lines([format!("#endif /* {guard} */"), String::new()])
    }

    fn finish(&self) -> String {
        self.lines.join("\n")
    }
}

fn numbers<T: ToString>(values: &[T]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

fn emit_layer(c: &mut SourceBuilder, layer: &Layer) {
    let id = &layer.c_identifier;
    let view = &layer.view;

    c.subsection_comment(&format!("Layer: {} - generated from {}", layer.name, view.id))
        .blank();

    c.line(format!("static const int num_keys_{id} = {};", view.num_keys()))
        .blank();
    let keycaps = view
        .rows
        .iter()
        .map(|row| row.iter().map(|key| key.keycap.to_c_value()).collect())
        .collect();
    c.array(
        "const char * const",
        &format!("keycaps_{id}"),
        keycaps,
        Some("\"\\n\""),
        Some("\"\""),
    )
    .blank();
    let attributes = view
        .rows
        .iter()
        .map(|row| row.iter().map(|key| key.attributes.to_string()).collect())
        .collect();
    c.array(
        "const lv_buttonmatrix_ctrl_t",
        &format!("attributes_{id}"),
        attributes,
        None,
        None,
    )
    .blank();

    c.line(format!(
        "static const int num_modifiers_{id} = {};",
        view.modifier_idxs.len()
    ))
    .blank();
    c.flat_array(
        "const int",
        &format!("modifier_idxs_{id}"),
        numbers(&view.modifier_idxs),
    )
    .blank();

    c.line(format!(
        "static const int num_switchers_{id} = {};",
        view.switchers.len()
    ))
    .blank();
    c.flat_array(
        "const int",
        &format!("switcher_idxs_{id}"),
        numbers(&layer.switcher_idxs()),
    )
    .blank();
    c.flat_array(
        "const int",
        &format!("switcher_dests_{id}"),
        numbers(&layer.switcher_dests),
    )
    .blank();

    if let Some(flat) = &layer.scancodes {
        let mut codes: Vec<Vec<String>> = Vec::with_capacity(view.rows.len());
        let mut idxs = Vec::with_capacity(view.rows.len());
        let mut nums = Vec::with_capacity(view.rows.len());
        let mut key = 0;
        for row in &view.rows {
            let range = key..key + row.len();
            codes.push(
                range
                    .clone()
                    .flat_map(|k| flat.key(k).iter().map(|code| format!("{code:?}")))
                    .collect(),
            );
            idxs.push(numbers(&flat.idxs[range.clone()]));
            nums.push(numbers(&flat.nums[range]));
            key += row.len();
        }

        c.line(format!(
            "static const int num_scancodes_{id} = {};",
            flat.codes.len()
        ))
        .blank();
        c.array("const int", &format!("scancodes_{id}"), codes, None, None)
            .blank();
        c.array("const int", &format!("scancode_idxs_{id}"), idxs, None, None)
            .blank();
        c.array("const int", &format!("scancode_nums_{id}"), nums, None, None)
            .blank();
    }
}

fn emit_layout(c: &mut SourceBuilder, layout: &Layout, scancodes: bool) {
    let id = &layout.id.c_identifier;

    c.section_comment(&format!(
        "Layout: {} - generated from {}",
        layout.name, layout.id.id
    ))
    .blank();
    c.line(format!(
        "static const char * const name_{id} = {};",
        quoted(&layout.name)
    ));
    c.line(format!(
        "static const char * const short_name_{id} = {};",
        quoted(layout.short_name())
    ))
    .blank();

    for layer in &layout.layers {
        emit_layer(c, layer);
    }

    let mut fields = LAYER_FIELDS.to_vec();
    if scancodes {
        fields.extend_from_slice(SCANCODE_FIELDS);
    }

    c.subsection_comment("Layer array").blank();
    c.line(format!(
        "static const int num_layers_{id} = {};",
        layout.layers.len()
    ))
    .blank();
    c.line(format!("static const sq2lv_layer_t layers_{id}[] = {{"));
    for (i, layer) in layout.layers.iter().enumerate() {
        c.line("    {");
        for (k, field) in fields.iter().enumerate() {
            c.line(format!(
                "        .{field} = {field}_{}{}",
                layer.c_identifier,
                comma_if_needed(fields.len(), k)
            ));
        }
        c.line(format!("    }}{}", comma_if_needed(layout.layers.len(), i)));
    }
    c.line("};").blank();
}

fn joined_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let quoted: Vec<String> = names.map(quoted).collect();
    format!("\n    {}", quoted.join(" \"\\n\"\n    "))
}

fn render_header(run: &Run) -> String {
    let mut h = SourceBuilder::new();
    h.include("lvgl/lvgl.h").blank();
    h.line(format!(
        "#define SQ2LV_SCANCODES_ENABLED {}",
        u8::from(run.scancodes)
    ))
    .blank();

    h.line("/* Layout IDs, values can be used as indexes into the sq2lv_layouts array */")
        .line("typedef enum {")
        .line("    SQ2LV_LAYOUT_NONE = -1,");
    for (i, layout) in run.layouts.iter().enumerate() {
        h.line(format!(
            "    SQ2LV_LAYOUT_{} = {i}{}",
            layout.id.c_identifier.to_uppercase(),
            comma_if_needed(run.layouts.len(), i)
        ));
    }
    h.line("} sq2lv_layout_id_t;").blank();

    h.lines([
        "/* Layer type */",
        "typedef struct {",
        "    /* Number of keys */",
        "    const int num_keys;",
        "    /* Key caps */",
        "    const char * const * const keycaps;",
        "    /* Key attributes */",
        "    const lv_buttonmatrix_ctrl_t * const attributes;",
        "    /* Number of modifier keys */",
        "    const int num_modifiers;",
        "    /* Button indexes of modifier keys */",
        "    const int * const modifier_idxs;",
        "    /* Number of buttons that trigger a layer switch */",
        "    const int num_switchers;",
        "    /* Button indexes that trigger a layer switch */",
        "    const int * const switcher_idxs;",
        "    /* Indexes of layers to jump to when triggering layer switch buttons */",
        "    const int * const switcher_dests;",
    ]);
    if run.scancodes {
        h.lines([
            "    /* Total number of scancodes */",
            "    const int num_scancodes;",
            "    /* Flat array of scancodes */",
            "    const int * const scancodes;",
            "    /* Start index in scancodes array for key cap */",
            "    const int * const scancode_idxs;",
            "    /* Number of scancodes for key cap */",
            "    const int * const scancode_nums;",
        ]);
    }
    h.line("} sq2lv_layer_t;").blank();

    h.lines([
        "/* Layout type */",
        "typedef struct {",
        "    /* Layout name */",
        "    const char * const name;",
        "    /* Layout short name */",
        "    const char * const short_name;",
        "    /* Total number of layers */",
        "    const int num_layers;",
        "    /* Layers array */",
        "    const sq2lv_layer_t * const layers;",
        "} sq2lv_layout_t;",
        "",
        "/* Layouts */",
        "extern const int sq2lv_num_layouts;",
        "extern const sq2lv_layout_t sq2lv_layouts[];",
        "",
        "/* Layout names (suitable for use in lv_dropdown_t) */",
        "extern const char * const sq2lv_layout_names;",
        "extern const char * const sq2lv_layout_short_names;",
        "",
    ]);

    if run.scancodes {
        h.lines([
            "/* Unique scancodes from all layout (suitable for setting up uinput devices) */",
            "extern const int sq2lv_num_unique_scancodes;",
            "extern const int sq2lv_unique_scancodes[];",
            "",
        ]);
    }

    h.wrap_in_ifndef("SQ2LV_LAYOUTS_H");
    h.finish()
}

fn render_source(run: &Run, shift_keycap: &str) -> String {
    let mut c = SourceBuilder::new();
    c.include(OUTFILE_H).include("../squeek2lvgl/sq2lv.h");
    if run.scancodes {
        c.system_include("linux/input.h");
    }
    c.blank();
    c.line(format!(
        "#define SQ2LV_SYMBOL_SHIFT {}",
        quoted(shift_keycap)
    ))
    .blank();

    for layout in &run.layouts {
        emit_layout(&mut c, layout, run.scancodes);
    }

    c.section_comment("Public interface").blank();
    c.line(format!(
        "const int sq2lv_num_layouts = {};",
        run.layouts.len()
    ))
    .blank();

    c.line("const sq2lv_layout_t sq2lv_layouts[] = {");
    for (i, layout) in run.layouts.iter().enumerate() {
        c.line(format!("    /* {} */", layout.name)).line("    {");
        for (j, field) in LAYOUT_FIELDS.iter().enumerate() {
            c.line(format!(
                "        .{field} = {field}_{}{}",
                layout.id.c_identifier,
                comma_if_needed(LAYOUT_FIELDS.len(), j)
            ));
        }
        c.line(format!("    }}{}", comma_if_needed(run.layouts.len(), i)));
    }
    c.line("};").blank();

    c.line(format!(
        "const char * const sq2lv_layout_names ={};",
        joined_names(run.layouts.iter().map(|layout| layout.name.as_str()))
    ))
    .blank();
    c.line(format!(
        "const char * const sq2lv_layout_short_names ={};",
        joined_names(run.layouts.iter().map(Layout::short_name))
    ))
    .blank();

    if run.scancodes {
        c.line(format!(
            "const int sq2lv_num_unique_scancodes = {};",
            run.unique_scancodes.len()
        ))
        .blank();
        c.line("const int sq2lv_unique_scancodes[] = {");
        let codes: Vec<String> = run
            .unique_scancodes
            .iter()
            .map(|code| format!("{code:?}"))
            .collect();
        let chunks: Vec<&[String]> = codes.chunks(10).collect();
        for (i, chunk) in chunks.iter().enumerate() {
            c.line(format!(
                "    {}{}",
                chunk.join(", "),
                comma_if_needed(chunks.len(), i)
            ));
        }
        c.line("};").blank();
    }

    c.finish()
}

/// Render the C source and header for a run.
pub(crate) fn render(run: &Run, shift_keycap: &str) -> (String, String) {
    (render_source(run, shift_keycap), render_header(run))
}

pub(crate) fn write_files(dir: &Path, run: &Run, shift_keycap: &str) -> Result<()> {
    let (source, header) = render(run, shift_keycap);
    for (file, content) in [(OUTFILE_C, source), (OUTFILE_H, header)] {
        let path = dir.join(file);
        fs::write(&path, content).with_context(|| format!("Could not write {}", path.display()))?;
        info!("Wrote {}", path.display());
    }
    Ok(())
}
