// Canvas drawing for the background and items.

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::{CanvasGradient, CanvasRenderingContext2d};

use crate::config::Viewport;
use crate::item::Item;

const BACKGROUND_STOPS: [(f32, &str); 3] = [
    (0.0, "rgb(53, 7, 83)"),
    (0.5, "rgb(131, 7, 81)"),
    (1.0, "rgb(107, 10, 110)"),
];

/// Diagonal purple gradient spanning the whole viewport.
pub(super) fn background_gradient(
    ctx: &CanvasRenderingContext2d,
    viewport: Viewport,
) -> Result<CanvasGradient, JsValue> {
    let grad = ctx.create_linear_gradient(0.0, 0.0, viewport.width, viewport.height);
    for (offset, color) in BACKGROUND_STOPS {
        grad.add_color_stop(offset, color)?;
    }
    Ok(grad)
}

pub(super) fn paint_background(
    ctx: &CanvasRenderingContext2d,
    grad: &CanvasGradient,
    viewport: Viewport,
) {
    ctx.set_fill_style_canvas_gradient(grad);
    ctx.fill_rect(0.0, 0.0, viewport.width, viewport.height);
}

/// Active items are outlined squares, complete items filled circles
/// inscribed in their square.
pub(super) fn draw_item(ctx: &CanvasRenderingContext2d, item: &Item) -> Result<(), JsValue> {
    let color = item.color.to_string();
    if item.complete {
        let (cx, cy) = item.center();
        let radius = item.size / 2.0;
        ctx.set_fill_style_str(&color);
        ctx.begin_path();
        ctx.ellipse(cx, cy, radius, radius, 0.0, 0.0, TAU)?;
        ctx.fill();
    } else {
        ctx.set_stroke_style_str(&color);
        ctx.set_line_width(item.stroke_width);
        ctx.stroke_rect(item.x, item.y, item.size, item.size);
    }
    Ok(())
}
