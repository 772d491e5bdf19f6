// src/bin/rewire.rs

use anyhow::{Context as _, Result};
use clap::Parser;
use std::env;
use std::path::Path;

use rewire::cli::{Cli, Command};
use rewire::core::hooks::LoaderHooks;
use rewire::core::registry::Registry;

/// El punto de entrada del inspector.
fn main() {
    // Inicializar el logger. Para ver los logs, ejecuta con `RUST_LOG=debug rewire ...`
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run_cli(cli) {
        // `eprintln` escribe en stderr; el formato `{:?}` de `anyhow`
        // incluye la cadena de causas.
        eprintln!("\nError: {:?}", e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    let start = match cli.path {
        Some(p) => p,
        None => env::current_dir().context("No se pudo obtener el directorio actual.")?,
    };
    log::debug!("Inspeccionando desde {:?}", start);

    let mut registry = Registry::new();
    registry
        .load_global_config()
        .context("La configuración global es inválida.")?;
    registry
        .ensure_context(&start)
        .with_context(|| format!("No se pudo cargar la configuración para '{}'.", start.display()))?;

    match cli.command {
        Command::Resolve { request } => handle_resolve(&registry, &start, &request),
        Command::Info => handle_info(&registry, &start),
    }
}

/// Muestra la reescritura que sufriría `request` pedida desde `start`.
fn handle_resolve(registry: &Registry, start: &Path, request: &str) -> Result<()> {
    match registry.resolve_request(request, start) {
        Some(rewritten) => println!("{rewritten}"),
        // Sin reescritura: la petición llegaría intacta al resolutor nativo.
        None => println!("{request}"),
    }
    Ok(())
}

/// Muestra el contexto descubierto para `start`.
fn handle_info(registry: &Registry, start: &Path) -> Result<()> {
    let Some(context) = registry.find(start) else {
        println!("No hay contexto registrado para '{}'.", start.display());
        return Ok(());
    };
    let context = context.borrow();

    println!("\n--- Contexto '{}' ---", context.name());
    let base = context.base();
    if base.as_os_str().is_empty() {
        println!("  Base:   (global)");
    } else {
        println!("  Base:   {}", base.display());
    }

    if context.rules().is_empty() {
        println!("  Sin reglas registradas.");
    } else {
        println!("  Reglas (prioridad descendente):");
        for rule in context.rules() {
            println!("    - [{}] {:?}", rule.kind(), rule);
        }
    }

    if !context.pre().is_empty() {
        println!("  Rutas pre:");
        for path in context.pre() {
            println!("    - {}", path.display());
        }
    }
    if !context.post().is_empty() {
        println!("  Rutas post:");
        for path in context.post() {
            println!("    - {}", path.display());
        }
    }

    println!("\n--------------------------");
    Ok(())
}
