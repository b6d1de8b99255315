use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use tracing::{debug, error};

use pocketcalc_core::{Calculator, DisplaySink, EngineOptions, Session};

use crate::methods;
use crate::protocol::{Request, Response};

const SERVER_NAME: &str = "pocketcalc";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display sink for the RPC driver: frames go to the log, the response
/// carries the text back to the host.
#[derive(Debug, Default)]
pub struct LoggedDisplay;

impl DisplaySink for LoggedDisplay {
    fn render(&mut self, text: &str) {
        debug!(display = text, "render");
    }
}

/// Run the JSON-RPC server on stdio. Blocks until stdin is closed.
pub fn run_server(options: EngineOptions) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut session = Session::new(Calculator::with_options(options), LoggedDisplay);
    serve(stdin.lock(), &mut stdout, &mut session)
}

/// Answer one request per input line until the input ends.
pub fn serve<R, W, D>(input: R, output: &mut W, session: &mut Session<D>) -> anyhow::Result<()>
where
    R: BufRead,
    W: Write,
    D: DisplaySink,
{
    for line in input.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("input read error: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                error!("invalid JSON-RPC: {e}");
                write_response(output, &Response::parse_error(&e))?;
                continue;
            }
        };

        let method = request.method.as_str();
        debug!("RPC request: {method}");

        // Notifications have no id, no response
        let id = match request.id.clone() {
            Some(id) => id,
            None => continue,
        };

        let response = match method {
            "initialize" => handle_initialize(id),
            "ping" => Response::ok(id, json!({})),
            other => match methods::call_method(session, id.clone(), &request) {
                Some(resp) => resp,
                None => Response::method_not_found(id, other),
            },
        };

        write_response(output, &response)?;
    }

    Ok(())
}

fn write_response<W: Write>(output: &mut W, resp: &Response) -> anyhow::Result<()> {
    let json = serde_json::to_string(resp)?;
    writeln!(output, "{json}")?;
    output.flush()?;
    Ok(())
}

fn handle_initialize(id: Value) -> Response {
    Response::ok(
        id,
        json!({
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            },
            "capabilities": {
                "methods": methods::method_definitions()
            },
            "keys": methods::key_vocabulary()
        }),
    )
}
