//! Container recipes picked by a census of the extracted files.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::language::Language;

/// Build stack a Dockerfile is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stack {
    Python,
    Node,
    Go,
    Rust,
    Generic,
}

impl Stack {
    /// Tie-break order for the census, most preferred first.
    const PREFERENCE: [Stack; 4] = [Stack::Python, Stack::Node, Stack::Go, Stack::Rust];

    fn of(language: Language) -> Option<Stack> {
        match language {
            Language::Python => Some(Stack::Python),
            Language::JavaScript | Language::TypeScript => Some(Stack::Node),
            Language::Go => Some(Stack::Go),
            Language::Rust => Some(Stack::Rust),
            _ => None,
        }
    }
}

/// Stack with the most source files; `Generic` when none are recognized.
pub fn dominant_stack<'a>(paths: impl IntoIterator<Item = &'a String>) -> Stack {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for path in paths {
        if let Some(stack) = Stack::of(Language::from_path(path)) {
            let rank = Stack::PREFERENCE
                .iter()
                .position(|s| *s == stack)
                .unwrap_or(Stack::PREFERENCE.len());
            *counts.entry(rank).or_default() += 1;
        }
    }

    // Highest count wins; on equal counts the lower rank (earlier preference) wins.
    counts
        .iter()
        .max_by(|(rank_a, count_a), (rank_b, count_b)| {
            count_a.cmp(count_b).then(rank_b.cmp(rank_a))
        })
        .and_then(|(rank, _)| Stack::PREFERENCE.get(*rank).copied())
        .unwrap_or(Stack::Generic)
}

/// Exec-form `CMD` running `command` through a shell.
fn shell_cmd(command: &str) -> String {
    format!(
        "CMD [\"sh\", \"-c\", {}]",
        Value::from(command)
    )
}

/// Inputs a Dockerfile depends on besides the stack.
pub struct DockerContext<'a> {
    pub run_command: Option<&'a str>,
    /// Python entry script to fall back on when no run command was captured.
    pub python_entry: &'a str,
    pub port: u16,
}

pub fn dockerfile(stack: Stack, ctx: &DockerContext<'_>) -> String {
    let cmd = |default: &str| match ctx.run_command {
        Some(command) => shell_cmd(command),
        None => default.to_string(),
    };

    match stack {
        Stack::Python => format!(
            "FROM python:3.11-slim\n\n\
             WORKDIR /app\n\n\
             COPY requirements.txt* ./\n\
             RUN if [ -f requirements.txt ]; then pip install --no-cache-dir -r requirements.txt; fi\n\n\
             COPY . .\n\n\
             EXPOSE {port}\n\n\
             {cmd}\n",
            port = ctx.port,
            cmd = cmd(&format!("CMD [\"python\", \"{}\"]", ctx.python_entry)),
        ),
        Stack::Node => format!(
            "FROM node:18-alpine\n\n\
             WORKDIR /app\n\n\
             COPY package*.json ./\n\
             RUN npm install\n\n\
             COPY . .\n\n\
             EXPOSE {port}\n\n\
             {cmd}\n",
            port = ctx.port,
            cmd = cmd("CMD [\"npm\", \"start\"]"),
        ),
        Stack::Go => format!(
            "FROM golang:1.21-alpine AS builder\n\n\
             WORKDIR /app\n\n\
             COPY go.* ./\n\
             RUN go mod download\n\n\
             COPY . .\n\
             RUN go build -o app .\n\n\
             FROM alpine:latest\n\
             RUN apk --no-cache add ca-certificates\n\
             WORKDIR /root/\n\n\
             COPY --from=builder /app/app .\n\n\
             EXPOSE {port}\n\n\
             CMD [\"./app\"]\n",
            port = ctx.port,
        ),
        Stack::Rust => format!(
            "FROM rust:1-slim AS builder\n\n\
             WORKDIR /app\n\n\
             COPY . .\n\
             RUN cargo install --path . --root /out\n\n\
             FROM debian:bookworm-slim\n\
             WORKDIR /app\n\n\
             COPY --from=builder /out/bin/ /usr/local/bin/\n\n\
             EXPOSE {port}\n\n\
             {cmd}\n",
            port = ctx.port,
            cmd = cmd("CMD [\"sh\", \"-c\", \"exec $(ls /usr/local/bin | head -n1)\"]"),
        ),
        Stack::Generic => format!(
            "FROM alpine:latest\n\n\
             WORKDIR /app\n\n\
             COPY . .\n\n\
             EXPOSE {port}\n\n\
             {cmd}\n",
            port = ctx.port,
            cmd = cmd("CMD [\"sh\"]"),
        ),
    }
}

pub fn docker_compose(port: u16) -> String {
    format!(
        "services:\n  \
           app:\n    \
             build: .\n    \
             ports:\n      \
               - \"{port}:{port}\"\n    \
             environment:\n      \
               - PORT={port}\n",
        port = port
    )
}
