use std::{collections::HashSet, fmt::Write, path::Path, str::FromStr};

use anyhow::bail;
use indoc::formatdoc;
use serde::Deserialize;
use serde_dynamic_string::DynamicString;
use toml::Value;

use crate::{Config, RouteRule};

pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Config> {
    let path = path.as_ref().to_path_buf();
    let content = std::fs::read_to_string(&path)?;
    let mut raw_config: Value = toml::from_str(&content)?;

    expand_dynamic_strings(&mut Vec::new(), &mut raw_config)?;

    let config = Config::deserialize(raw_config)?;
    validate_routes(&config.routes)?;

    if config.routes.is_empty() {
        log::warn!("No routes configured, every path will be reachable by any authenticated session");
    }

    log::debug!(
        "Loaded {} route rules from {}, identity authority at {}",
        config.routes.len(),
        path.display(),
        config.authority.url
    );

    Ok(config)
}

/// Checks the route table invariants: absolute paths, no duplicates, and a non-empty
/// allow-list on every rule.
pub fn validate_routes(routes: &[RouteRule]) -> anyhow::Result<()> {
    let mut seen = HashSet::with_capacity(routes.len());

    for route in routes {
        if !route.path.starts_with('/') {
            bail!("Route path '{}' must start with '/'", route.path);
        }

        if !seen.insert(route.path.as_str()) {
            bail!("Route path '{}' is declared more than once", route.path);
        }

        if route.allowed_roles.is_empty() {
            bail!(
                "{}",
                formatdoc! {r#"
                Route '{}' has no allowed roles. Every protected route needs at least one role, for example:

                  [[routes]]
                  path = "/admin"
                  label = "Admin Panel"
                  allowed_roles = ["admin"]

                Remove the route instead if it should be reachable by every authenticated session.
            "#, route.path}
            );
        }
    }

    Ok(())
}

fn expand_dynamic_strings<'a>(path: &mut Vec<Result<&'a str, usize>>, value: &'a mut Value) -> anyhow::Result<()> {
    match value {
        Value::String(s) => match DynamicString::<String>::from_str(s) {
            Ok(out) => *s = out.into_inner(),
            Err(err) => {
                let mut p = String::new();
                for segment in path {
                    match segment {
                        Ok(s) => {
                            p.push_str(s);
                            p.push('.');
                        }
                        Err(i) => write!(p, "[{i}]")?,
                    }
                }
                if p.ends_with('.') {
                    p.pop();
                }

                bail!("Failed to expand dynamic string at path '{p}': {err}");
            }
        },
        Value::Array(values) => {
            for (i, value) in values.iter_mut().enumerate() {
                path.push(Err(i));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Table(map) => {
            for (key, value) in map {
                path.push(Ok(key.as_str()));
                expand_dynamic_strings(path, value)?;
                path.pop();
            }
        }
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Datetime(_) => (),
    }

    Ok(())
}
