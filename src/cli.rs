// src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Rewire: inspección de la capa de reescritura de módulos.", long_about = None)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Ruta de partida para el descubrimiento de configuración
    /// (por defecto, el directorio actual).
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resuelve una petición de import y muestra la reescritura aplicada.
    Resolve {
        /// La petición a resolver (p. ej. "@app/utils").
        request: String,
    },
    /// Muestra el contexto descubierto: nombre, base, reglas y rutas.
    Info,
}
