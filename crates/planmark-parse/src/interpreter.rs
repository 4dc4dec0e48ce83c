//! Content stream interpreter.
//!
//! Walks the operators of a decoded content stream, maintaining the graphics
//! and text state, and reports painted text, paths and images to a
//! [`ContentHandler`]. Form XObjects are interpreted recursively up to
//! [`ExtractOptions::max_recursion_depth`].
//!
//! Problems local to one operator (malformed operands, a missing font or
//! XObject) are logged and skipped. Only an undecodable stream or an
//! exceeded recursion limit fails the call.

use std::collections::HashMap;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object};
use planmark_core::{Ctm, ExtractOptions};

use crate::error::BackendError;
use crate::fonts::{LoadedFont, load_font, number, resolve, stream_bytes};
use crate::handler::{ContentHandler, ImageEvent, PaintOp, PathEvent, SpanEvent};
use crate::interpreter_state::InterpreterState;
use crate::text_state::TextState;

/// Interpret one content stream.
///
/// * `depth` - Form XObject nesting level, 0 for the page itself.
#[allow(clippy::too_many_arguments)]
pub(crate) fn interpret_content_stream(
    doc: &Document,
    stream_bytes: &[u8],
    resources: &Dictionary,
    handler: &mut dyn ContentHandler,
    options: &ExtractOptions,
    depth: usize,
    gstate: &mut InterpreterState,
    tstate: &mut TextState,
) -> Result<(), BackendError> {
    if depth > options.max_recursion_depth {
        return Err(BackendError::Interpreter(format!(
            "Form XObject recursion depth {depth} exceeds limit {}",
            options.max_recursion_depth
        )));
    }

    let content = Content::decode(stream_bytes)
        .map_err(|e| BackendError::Interpreter(format!("failed to decode content stream: {e}")))?;

    let mut fonts: HashMap<String, LoadedFont> = HashMap::new();
    // Construction operators seen since the last paint or `n`.
    let mut segments = 0usize;

    for op in &content.operations {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            // --- Graphics state ---
            "q" => gstate.save_state(tstate.params.clone()),
            "Q" => {
                if let Some(params) = gstate.restore_state() {
                    tstate.params = params;
                }
            }
            "cm" => match matrix(operands) {
                Some(m) => gstate.concat_matrix(&m),
                None => malformed(op),
            },

            // --- Text objects and state ---
            "BT" => tstate.begin_text(),
            "ET" => tstate.end_text(),
            "Tf" => match (operands.first().and_then(name), num(operands, 1)) {
                (Some(font), Some(size)) => tstate.set_font(font, size),
                _ => malformed(op),
            },
            "Tc" => match num(operands, 0) {
                Some(v) => tstate.params.char_spacing = v,
                None => malformed(op),
            },
            "Tw" => match num(operands, 0) {
                Some(v) => tstate.params.word_spacing = v,
                None => malformed(op),
            },
            "Tz" => match num(operands, 0) {
                Some(v) => tstate.params.h_scaling = v,
                None => malformed(op),
            },
            "TL" => match num(operands, 0) {
                Some(v) => tstate.params.leading = v,
                None => malformed(op),
            },
            "Ts" => match num(operands, 0) {
                Some(v) => tstate.params.rise = v,
                None => malformed(op),
            },

            // --- Text positioning ---
            "Td" => match (num(operands, 0), num(operands, 1)) {
                (Some(tx), Some(ty)) => tstate.move_text_position(tx, ty),
                _ => malformed(op),
            },
            "TD" => match (num(operands, 0), num(operands, 1)) {
                (Some(tx), Some(ty)) => tstate.move_text_position_and_set_leading(tx, ty),
                _ => malformed(op),
            },
            "Tm" => match matrix(operands) {
                Some(m) => tstate.set_text_matrix(m),
                None => malformed(op),
            },
            "T*" => tstate.move_to_next_line(),

            // --- Text showing ---
            "Tj" => match operands.first() {
                Some(s @ Object::String(..)) => show_text(
                    doc,
                    resources,
                    handler,
                    gstate,
                    tstate,
                    &mut fonts,
                    std::slice::from_ref(s),
                ),
                _ => malformed(op),
            },
            "TJ" => match operands.first() {
                Some(Object::Array(items)) => {
                    show_text(doc, resources, handler, gstate, tstate, &mut fonts, items)
                }
                _ => malformed(op),
            },
            "'" => match operands.first() {
                Some(s @ Object::String(..)) => {
                    tstate.move_to_next_line();
                    show_text(
                        doc,
                        resources,
                        handler,
                        gstate,
                        tstate,
                        &mut fonts,
                        std::slice::from_ref(s),
                    );
                }
                _ => malformed(op),
            },
            "\"" => match (num(operands, 0), num(operands, 1), operands.get(2)) {
                (Some(aw), Some(ac), Some(s @ Object::String(..))) => {
                    tstate.params.word_spacing = aw;
                    tstate.params.char_spacing = ac;
                    tstate.move_to_next_line();
                    show_text(
                        doc,
                        resources,
                        handler,
                        gstate,
                        tstate,
                        &mut fonts,
                        std::slice::from_ref(s),
                    );
                }
                _ => malformed(op),
            },

            // --- Path construction and painting ---
            "m" | "l" | "c" | "v" | "y" | "re" | "h" => segments += 1,
            "S" | "s" => paint(handler, gstate, &mut segments, PaintOp::Stroke),
            "f" | "F" | "f*" => paint(handler, gstate, &mut segments, PaintOp::Fill),
            "B" | "B*" | "b" | "b*" => {
                paint(handler, gstate, &mut segments, PaintOp::FillAndStroke)
            }
            "n" => segments = 0,

            // --- XObjects ---
            "Do" => match operands.first().and_then(name) {
                Some(xobject) => {
                    if let Err(e) = handle_do(
                        doc, resources, handler, options, depth, gstate, tstate, &xobject,
                    ) {
                        tracing::warn!(xobject = %xobject, error = %e, "skipping XObject");
                    }
                }
                None => malformed(op),
            },

            other => tracing::trace!(operator = other, "ignoring operator"),
        }
    }

    Ok(())
}

fn malformed(op: &Operation) {
    tracing::warn!(
        operator = %op.operator,
        operands = op.operands.len(),
        "malformed operands, operator skipped"
    );
}

fn num(operands: &[Object], index: usize) -> Option<f64> {
    operands.get(index).and_then(number)
}

fn name(obj: &Object) -> Option<String> {
    obj.as_name()
        .ok()
        .map(|n| String::from_utf8_lossy(n).into_owned())
}

/// Six numeric operands as a matrix.
fn matrix(operands: &[Object]) -> Option<Ctm> {
    if operands.len() < 6 {
        return None;
    }
    Some(Ctm::new(
        num(operands, 0)?,
        num(operands, 1)?,
        num(operands, 2)?,
        num(operands, 3)?,
        num(operands, 4)?,
        num(operands, 5)?,
    ))
}

fn paint(
    handler: &mut dyn ContentHandler,
    gstate: &InterpreterState,
    segments: &mut usize,
    paint_op: PaintOp,
) {
    if *segments > 0 {
        handler.on_path_painted(PathEvent {
            paint_op,
            segment_count: *segments,
            ctm: *gstate.ctm(),
        });
    }
    *segments = 0;
}

/// Show strings and `TJ` adjustments as one span.
///
/// The text matrix is advanced glyph by glyph; the span covers the total
/// displacement. Spans that decode to no text are not reported.
#[allow(clippy::too_many_arguments)]
fn show_text(
    doc: &Document,
    resources: &Dictionary,
    handler: &mut dyn ContentHandler,
    gstate: &InterpreterState,
    tstate: &mut TextState,
    fonts: &mut HashMap<String, LoadedFont>,
    items: &[Object],
) {
    let font_name = tstate.params.font_name.clone();
    let font = fonts
        .entry(font_name.clone())
        .or_insert_with(|| match load_font(doc, resources, &font_name) {
            Ok(font) => font,
            Err(e) => {
                tracing::warn!(font = %font_name, error = %e, "using default font metrics");
                LoadedFont::fallback(&font_name)
            }
        });

    let start = *tstate.text_matrix();
    let mut text = String::new();
    let mut advance = 0.0;

    for item in items {
        match item {
            Object::String(bytes, _) => {
                for glyph in font.decode(bytes) {
                    let tx = tstate.glyph_advance(font.metrics.get_width(glyph.code), glyph.is_space);
                    tstate.advance(tx);
                    advance += tx;
                    text.push_str(&glyph.text);
                }
            }
            other => {
                if let Some(adjustment) = number(other) {
                    let tx = tstate.adjustment_advance(adjustment);
                    tstate.advance(tx);
                    advance += tx;
                }
            }
        }
    }

    if text.is_empty() {
        return;
    }

    handler.on_span(SpanEvent {
        text,
        font_name: font.base_name.clone(),
        font_size: tstate.params.font_size,
        text_matrix: start,
        ctm: *gstate.ctm(),
        advance,
        rise: tstate.params.rise,
        ascent: font.metrics.ascent(),
        descent: font.metrics.descent(),
        text_object: tstate.text_object(),
        line: tstate.line(),
    });
}

#[allow(clippy::too_many_arguments)]
fn handle_do(
    doc: &Document,
    resources: &Dictionary,
    handler: &mut dyn ContentHandler,
    options: &ExtractOptions,
    depth: usize,
    gstate: &mut InterpreterState,
    tstate: &mut TextState,
    name: &str,
) -> Result<(), BackendError> {
    let xobjects = resources
        .get(b"XObject")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .ok_or_else(|| BackendError::Interpreter("no /XObject dictionary in resources".into()))?;

    let id = xobjects
        .get(name.as_bytes())
        .map_err(|_| BackendError::Interpreter(format!("XObject /{name} not found in resources")))?
        .as_reference()
        .map_err(|_| BackendError::Interpreter(format!("XObject /{name} is not a reference")))?;

    let stream = doc
        .get_object(id)
        .and_then(Object::as_stream)
        .map_err(|e| BackendError::Interpreter(format!("XObject /{name} is not a stream: {e}")))?;

    match stream.dict.get(b"Subtype").ok().and_then(|o| o.as_name().ok()) {
        Some(b"Form") => {
            handle_form_xobject(doc, stream, resources, handler, options, depth, gstate, tstate)
        }
        Some(b"Image") => {
            let dimension = |key: &[u8]| {
                stream
                    .dict
                    .get(key)
                    .ok()
                    .and_then(|o| o.as_i64().ok())
                    .and_then(|v| u32::try_from(v).ok())
                    .unwrap_or(0)
            };
            handler.on_image(ImageEvent {
                name: name.to_string(),
                object_id: id,
                ctm: *gstate.ctm(),
                width: dimension(b"Width"),
                height: dimension(b"Height"),
            });
            Ok(())
        }
        _ => Ok(()),
    }
}

#[allow(clippy::too_many_arguments)]
fn handle_form_xobject(
    doc: &Document,
    stream: &lopdf::Stream,
    parent_resources: &Dictionary,
    handler: &mut dyn ContentHandler,
    options: &ExtractOptions,
    depth: usize,
    gstate: &mut InterpreterState,
    tstate: &mut TextState,
) -> Result<(), BackendError> {
    gstate.save_state(tstate.params.clone());

    if let Some(m) = stream
        .dict
        .get(b"Matrix")
        .ok()
        .and_then(|o| o.as_array().ok())
        .and_then(|arr| matrix(arr))
    {
        gstate.concat_matrix(&m);
    }

    let resources = stream
        .dict
        .get(b"Resources")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
        .unwrap_or(parent_resources);

    let result = stream_bytes(stream).and_then(|bytes| {
        interpret_content_stream(
            doc,
            &bytes,
            resources,
            handler,
            options,
            depth + 1,
            gstate,
            tstate,
        )
    });

    if let Some(params) = gstate.restore_state() {
        tstate.params = params;
    }
    result
}
