//! Canvas wiring and the frame loop.

use std::cell::RefCell;
use std::rc::Rc;

use glscene_core::{ImageData, Mesh, Renderer, SceneConfig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext, Window};

/// Vertex stage for the demo scene. Attribute and uniform names are
/// the contract the cube mesh and the renderer bind against.
const VERTEX_SHADER: &str = r#"#version 300 es
in vec3 aVertexPosition;
in vec2 aTextureCoord;
in vec4 aVertexColor;

uniform mat4 uProjectionMatrix;
uniform mat4 uViewMatrix;
uniform mat4 uModelMatrix;

out vec2 vTextureCoord;
out vec4 vColor;

void main() {
    gl_Position = uProjectionMatrix * uViewMatrix * uModelMatrix * vec4(aVertexPosition, 1.0);
    vTextureCoord = aTextureCoord;
    vColor = aVertexColor;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

in vec2 vTextureCoord;
in vec4 vColor;

uniform sampler2D uSampler;

out vec4 outColor;

void main() {
    outColor = texture(uSampler, vTextureCoord) * vColor;
}
"#;

/// Initializes rendering into the canvas matched by `selector` (e.g.
/// `"#glscene-canvas"`) and starts the frame loop.
///
/// # Errors
///
/// Fails immediately if the selector matches nothing, the element is
/// not a canvas, the browser cannot create a WebGL2 context, or scene
/// initialization fails. Once the loop is running, per-frame errors
/// are logged to the console instead and the loop keeps going.
#[wasm_bindgen]
pub fn start(selector: &str) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    // Double initialization only matters when start() is called twice;
    // the second logger install failing is harmless.
    let _ = console_log::init_with_level(log::Level::Info);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window object"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document object"))?;

    let element = document
        .query_selector(selector)
        .map_err(|_| JsValue::from_str(&format!("invalid selector: {selector}")))?
        .ok_or_else(|| JsValue::from_str(&format!("no element matches selector {selector}")))?;
    let canvas: HtmlCanvasElement = element
        .dyn_into()
        .map_err(|_| JsValue::from_str(&format!("element {selector} is not a canvas")))?;

    let context = canvas
        .get_context("webgl2")
        .map_err(|_| JsValue::from_str("WebGL2 context creation failed"))?
        .ok_or_else(|| {
            JsValue::from_str("unable to initialize WebGL2; this browser or machine may not support it")
        })?;
    let context: WebGl2RenderingContext = context
        .dyn_into()
        .map_err(|_| JsValue::from_str("webgl2 context has an unexpected type"))?;
    let gl = glow::Context::from_webgl2_context(context);

    let width = canvas.client_width();
    let height = canvas.client_height();
    let aspect = if width > 0 && height > 0 {
        width as f32 / height as f32
    } else {
        1.0
    };

    let mut renderer = Renderer::new();
    renderer
        .initialize_scene(
            &gl,
            SceneConfig {
                vertex_source: VERTEX_SHADER,
                fragment_source: FRAGMENT_SHADER,
                mesh: Mesh::cube(),
                image: Some(checkerboard(256, 32).map_err(render_error)?),
                aspect,
            },
        )
        .map_err(render_error)?;
    log::info!("scene initialized on {selector} ({width}x{height})");

    run_frame_loop(window, gl, renderer);
    Ok(())
}

fn render_error(err: glscene_core::RenderError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// A two-tone checkerboard, `size` pixels square with `cell`-pixel
/// cells. 256 is a power of two, so the demo exercises the mip path.
fn checkerboard(size: u32, cell: u32) -> Result<ImageData, glscene_core::RenderError> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let light = ((x / cell) + (y / cell)) % 2 == 0;
            let tone = if light { 0xe6 } else { 0x5a };
            pixels.extend_from_slice(&[tone, tone, tone, 0xff]);
        }
    }
    ImageData::new(size, size, pixels)
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Hands the renderer to a self-re-arming requestAnimationFrame
/// closure. The closure owns the GL context and renderer and keeps
/// itself alive through the shared handle; it runs until the page goes
/// away, which is the intended lifetime.
fn run_frame_loop(window: Window, gl: glow::Context, mut renderer: Renderer) {
    let callback: FrameCallback = Rc::new(RefCell::new(None));
    let handle = Rc::clone(&callback);
    let loop_window = window.clone();

    *callback.borrow_mut() = Some(Closure::new(move |now_ms: f64| {
        if let Err(err) = renderer.frame(&gl, now_ms) {
            log::error!("frame at {now_ms}ms failed: {err}");
        }
        schedule_frame(&loop_window, &handle);
    }));
    schedule_frame(&window, &callback);
}

fn schedule_frame(window: &Window, callback: &FrameCallback) {
    if let Some(closure) = callback.borrow().as_ref() {
        if let Err(err) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame rejected the frame callback: {err:?}");
        }
    }
}
