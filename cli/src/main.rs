//! rpcerrors CLI — normalize RPC failures from the terminal.
//!
//! Usage:
//! ```bash
//! # Normalize a JSON-RPC error reply
//! rpcerrors normalize --response '{"id":1,"error":{"message":"Invalid input","data":{"code":"BAD_REQUEST"}}}'
//!
//! # Normalize a transport failure, with call metadata
//! rpcerrors normalize --failure "connection refused" --url http://localhost:3000 --meta requestId=abc
//!
//! # Output as JSON
//! rpcerrors normalize --response '{"error":{}}' --json
//!
//! # List error codes
//! rpcerrors codes
//! ```

use std::env;
use std::process;

use rpcerrors_core::{ClientError, DefaultErrorShape, ErrorCode, ErrorShape, Meta};
use rpcerrors_jsonrpc::{
    decode_response, into_client_result, ResponseMeta, TransportError, RESPONSE_KEY,
};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "normalize" => cmd_normalize(&args[2..]),
        "codes" => cmd_codes(),
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("rpcerrors {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("rpcerrors {}", env!("CARGO_PKG_VERSION"));
    println!("Normalize RPC call failures into one client error\n");
    println!("USAGE:");
    println!("    rpcerrors <COMMAND>\n");
    println!("COMMANDS:");
    println!("    normalize  Normalize an error reply or a transport failure");
    println!("    codes      List error codes");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("NORMALIZE FLAGS:");
    println!("    --response <JSON>   JSON-RPC reply body       [one of --response/--failure]");
    println!("    --failure <MSG>     Transport failure message [one of --response/--failure]");
    println!("    --url <URL>         Endpoint, recorded in meta.response");
    println!("    --status <CODE>     HTTP status, recorded in meta.response");
    println!("    --meta <KEY=VALUE>  Extra metadata (repeatable)");
    println!("    --untyped           Keep the error shape as raw JSON");
    println!("    --json              Output as JSON\n");
    println!("Set RUST_LOG=trace to see normalization decisions.");
}

fn cmd_codes() {
    println!("{:<24} {:>8} {:>6}", "CODE", "JSON-RPC", "HTTP");
    for code in ErrorCode::ALL {
        println!(
            "{:<24} {:>8} {:>6}",
            code.key(),
            code.json_rpc_code(),
            code.http_status()
        );
    }
}

fn cmd_normalize(args: &[String]) {
    let mut response: Option<&str> = None;
    let mut failure: Option<String> = None;
    let mut url: Option<String> = None;
    let mut status: Option<u16> = None;
    let mut extra = Meta::new();
    let mut untyped = false;
    let mut as_json = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--response" => {
                i += 1;
                response = args.get(i).map(|s| s.as_str());
            }
            "--failure" => {
                i += 1;
                failure = args.get(i).cloned();
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned();
            }
            "--status" => {
                i += 1;
                status = match args.get(i).map(|s| s.parse::<u16>()) {
                    Some(Ok(s)) => Some(s),
                    _ => {
                        eprintln!("Error: --status expects an HTTP status code");
                        process::exit(1);
                    }
                };
            }
            "--meta" => {
                i += 1;
                match args.get(i).and_then(|kv| kv.split_once('=')) {
                    Some((RESPONSE_KEY, _)) => {
                        eprintln!("Error: --meta key `{RESPONSE_KEY}` is reserved");
                        process::exit(1);
                    }
                    Some((k, v)) => {
                        extra.insert(k.to_string(), Value::String(v.to_string()));
                    }
                    None => {
                        eprintln!("Error: --meta expects KEY=VALUE");
                        process::exit(1);
                    }
                }
            }
            "--untyped" => untyped = true,
            "--json" => as_json = true,
            flag => {
                eprintln!("Unknown flag: {flag}");
                process::exit(1);
            }
        }
        i += 1;
    }

    let outcome_body = match (response, failure) {
        (Some(body), None) => Ok(body.as_bytes()),
        (None, Some(msg)) => Err(TransportError::Other(msg)),
        _ => {
            eprintln!("Error: exactly one of --response or --failure is required");
            process::exit(1);
        }
    };

    let response_meta = if url.is_some() || status.is_some() || !extra.is_empty() {
        Some(ResponseMeta { url, status, extra })
    } else {
        None
    };
    tracing::debug!(untyped, with_meta = response_meta.is_some(), "normalizing");

    if untyped {
        let outcome = outcome_body.and_then(decode_response::<Value>);
        report(into_client_result(outcome, response_meta), as_json);
    } else {
        let outcome = outcome_body.and_then(decode_response::<DefaultErrorShape>);
        report(into_client_result(outcome, response_meta), as_json);
    }
}

fn report<S>(result: Result<Value, ClientError<S>>, as_json: bool)
where
    S: ErrorShape + Serialize,
    S::Data: Serialize,
{
    let err = match result {
        Ok(value) => {
            println!("Call succeeded: {value}");
            return;
        }
        Err(err) => err,
    };

    if as_json {
        match serde_json::to_string_pretty(&err) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("JSON serialization error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    println!("{}: {}", err.name(), err.message());
    if err.is_remote() {
        println!("  Origin:  remote");
        if let Some(data) = err.data() {
            println!("  Data:    {data:?}");
        }
    } else if err.is_transport() {
        println!("  Origin:  transport");
        for (depth, msg) in err.cause_chain().iter().enumerate() {
            println!("  Cause {depth}: {msg}");
        }
    } else {
        println!("  Origin:  unrecognized");
    }
    if let Some(meta) = err.meta() {
        for (k, v) in meta {
            println!("  Meta:    {k}={v}");
        }
    }
}
