// src/constants.rs

/// El nombre del archivo de configuración dedicado (visible) de rewire.
pub const REWIRE_CONFIG_FILENAME: &str = "rewire.toml";

/// El nombre del archivo de configuración dedicado (oculto).
pub const REWIRE_HIDDEN_CONFIG_FILENAME: &str = ".rewire.toml";

/// El nombre del manifiesto genérico de proyecto. La configuración de rewire
/// vive anidada en su tabla `[rewire]`.
pub const MANIFEST_FILENAME: &str = "package.toml";

/// Los candidatos a archivo de configuración, en orden de prioridad.
/// Al buscar en un directorio se prueba cada nombre en este orden.
pub const CONFIG_FILES: [&str; 3] = [
    REWIRE_CONFIG_FILENAME,
    REWIRE_HIDDEN_CONFIG_FILENAME,
    MANIFEST_FILENAME,
];

/// El marcador que separa la lista `include` en rutas "pre" y "post".
pub const INCLUDE_SEPARATOR: &str = "%";

/// El nombre del subdirectorio de configuración global (en ~/.config/).
pub const GLOBAL_CONFIG_DIR: &str = "rewire";
