// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! `events` module - EventEmitter

use crate::value::{Function, Value};

const DEFAULT_MAX_LISTENERS: f64 = 10.0;

/// Create the events module exports
pub fn create_module() -> Value {
    let emitter = Function::native("EventEmitter", |_args| Ok(create_emitter()));
    emitter.set("defaultMaxListeners", Value::Number(DEFAULT_MAX_LISTENERS));

    Value::object_from([
        ("EventEmitter", Value::Function(emitter)),
        ("defaultMaxListeners", Value::Number(DEFAULT_MAX_LISTENERS)),
        (
            "once",
            Value::Function(Function::native("once", |_args| Ok(Value::Undefined))),
        ),
    ])
}

/// Build an emitter instance.
///
/// Listeners live in a per-event object of `length`-indexed entries.
fn create_emitter() -> Value {
    let listeners = Value::object();
    let instance = Value::object();
    instance.set("_events", listeners.clone());

    let on_events = listeners.clone();
    instance.set(
        "on",
        Value::Function(Function::native("on", move |args| {
            let (Some(Value::String(event)), Some(callback)) = (args.first(), args.get(1)) else {
                return Ok(Value::Undefined);
            };
            let list = match on_events.get(event) {
                Some(list) => list,
                None => {
                    let list = Value::object_from([("length", Value::Number(0.0))]);
                    on_events.set(event.clone(), list.clone());
                    list
                }
            };
            let len = match list.get("length") {
                Some(Value::Number(n)) => n,
                _ => 0.0,
            };
            list.set(format!("{}", len as usize), callback.clone());
            list.set("length", Value::Number(len + 1.0));
            Ok(Value::Undefined)
        })),
    );

    let emit_events = listeners;
    instance.set(
        "emit",
        Value::Function(Function::native("emit", move |args| {
            let Some(Value::String(event)) = args.first() else {
                return Ok(Value::Boolean(false));
            };
            let Some(list) = emit_events.get(event) else {
                return Ok(Value::Boolean(false));
            };
            let len = match list.get("length") {
                Some(Value::Number(n)) => n as usize,
                _ => 0,
            };
            for i in 0..len {
                if let Some(Value::Function(callback)) = list.get(&i.to_string()) {
                    callback.call(&args[1..])?;
                }
            }
            Ok(Value::Boolean(len > 0))
        })),
    );

    instance
}
