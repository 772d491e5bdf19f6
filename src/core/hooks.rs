// src/core/hooks.rs

use std::path::{Path, PathBuf};

use crate::core::context::ConfigResult;
use crate::core::paths;
use crate::core::registry::Registry;

/// Los tres puntos de intercepción sobre la maquinaria de carga del host.
///
/// El mecanismo concreto de instalación (hooks de import, middleware del
/// cargador, overlay de sistema de archivos...) es un adaptador que aporta
/// el embebedor; aquí solo se define el contrato de cada punto. En los tres,
/// el host delega en su implementación nativa cuando no hay reescritura.
pub trait LoaderHooks {
    /// Punto 1 — reescritura de la petición. Para una petición desnuda se
    /// consultan, por orden, el contexto global y el contexto de paquete más
    /// cercano al solicitante (si ya está registrado; este punto NUNCA
    /// dispara descubrimiento de configuración). `Some` es la petición
    /// reescrita que el host debe pasar a su resolutor nativo; `None` deja
    /// pasar la petición original sin cambios.
    fn resolve_request(&self, request: &str, requester: &Path) -> Option<String>;

    /// Punto 2 — expansión de rutas de búsqueda. Tras calcular el host su
    /// lista nativa, las rutas "pre" del contexto del solicitante se anteponen
    /// y las "post" se añaden al final. Sin contexto registrado, la lista
    /// queda intacta.
    fn expand_lookup_paths(&self, requester: &Path, lookup_paths: &mut Vec<PathBuf>);

    /// Punto 3 — al materializar (cargar) un módulo, garantizar que su
    /// directorio tiene contexto, descubriendo y cargando configuración si
    /// hace falta. Es el ÚNICO punto que crea contextos nuevos.
    fn ensure_context(&mut self, file: &Path) -> ConfigResult<()>;
}

impl LoaderHooks for Registry {
    fn resolve_request(&self, request: &str, requester: &Path) -> Option<String> {
        if !paths::is_bare(request) {
            return None;
        }
        let mut candidates = vec![self.global()];
        if let Some(package) = self.find(requester) {
            candidates.push(package);
        }
        for context in candidates {
            if let Some(resolved) = context.borrow().resolve(request) {
                return Some(resolved.to_string_lossy().into_owned());
            }
        }
        None
    }

    fn expand_lookup_paths(&self, requester: &Path, lookup_paths: &mut Vec<PathBuf>) {
        if let Some(context) = self.find(requester) {
            let context = context.borrow();
            let mut expanded =
                Vec::with_capacity(context.pre().len() + lookup_paths.len() + context.post().len());
            expanded.extend_from_slice(context.pre());
            expanded.append(lookup_paths);
            expanded.extend_from_slice(context.post());
            *lookup_paths = expanded;
        }
    }

    fn ensure_context(&mut self, file: &Path) -> ConfigResult<()> {
        self.get_or_create(file).map(|_| ())
    }
}
