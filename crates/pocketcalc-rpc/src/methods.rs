use serde_json::{json, Value};

use pocketcalc_core::{DisplaySink, KeyEvent, Session};

use crate::protocol::{Request, Response, INTERNAL_ERROR};

// ---------------------------------------------------------------------------
// Method catalogue for initialize
// ---------------------------------------------------------------------------

pub fn method_definitions() -> Value {
    json!([
        {
            "name": "calculator/press",
            "description": "Press one key and return the new display text.",
            "params": {
                "type": "object",
                "properties": {
                    "key": {
                        "type": "string",
                        "description": "Key token, e.g. '7', '.', '+', '=', '%', 'sqrt', 'neg', 'M+', 'M-', 'MRC', 'CE', 'AC'"
                    }
                },
                "required": ["key"]
            }
        },
        {
            "name": "calculator/display",
            "description": "Current display text without pressing anything.",
            "params": { "type": "object", "properties": {} }
        },
        {
            "name": "calculator/state",
            "description": "Full calculator state: display, pending operand and operator, memory.",
            "params": { "type": "object", "properties": {} }
        },
        {
            "name": "calculator/reset",
            "description": "Press AC: clear everything including memory.",
            "params": { "type": "object", "properties": {} }
        }
    ])
}

/// Every key token the server accepts, in keypad order.
pub fn key_vocabulary() -> Vec<String> {
    let mut keys: Vec<String> = (0..=9).map(|d| d.to_string()).collect();
    keys.extend(
        [
            ".", "+", "-", "*", "/", "=", "%", "sqrt", "neg", "M+", "M-", "MRC", "CE", "AC",
        ]
        .map(String::from),
    );
    keys
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run a calculator method. Returns `None` for methods this module does not own.
pub fn call_method<D: DisplaySink>(
    session: &mut Session<D>,
    id: Value,
    request: &Request,
) -> Option<Response> {
    let response = match request.method.as_str() {
        "calculator/press" => method_press(session, id, request),
        "calculator/display" => display_response(id, session.calculator().current_display()),
        "calculator/state" => method_state(session, id),
        "calculator/reset" => {
            let text = session.press(KeyEvent::ClearAll).to_string();
            display_response(id, &text)
        }
        _ => return None,
    };
    Some(response)
}

fn method_press<D: DisplaySink>(session: &mut Session<D>, id: Value, request: &Request) -> Response {
    let Some(token) = request.str_param("key") else {
        return Response::invalid_params(id, "missing required field: key");
    };

    let key = match token.parse::<KeyEvent>() {
        Ok(k) => k,
        Err(e) => {
            return Response::invalid_params(id, e.to_string())
                .with_data(json!({ "token": token, "accepted": key_vocabulary() }))
        }
    };

    let text = session.press(key).to_string();
    display_response(id, &text)
}

fn method_state<D: DisplaySink>(session: &Session<D>, id: Value) -> Response {
    match serde_json::to_value(session.calculator().snapshot()) {
        Ok(state) => Response::ok(id, state),
        Err(e) => Response::err(id, INTERNAL_ERROR, format!("serialization error: {e}")),
    }
}

fn display_response(id: Value, text: &str) -> Response {
    Response::ok(id, json!({ "display": text }))
}
