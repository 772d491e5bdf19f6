// src/core/paths.rs

use std::env;
use std::path::{Component, Path, PathBuf};

/// ¿Es la petición "desnuda" (un nombre de paquete) y no una ruta?
/// Las rutas empiezan por `.` o por un separador y nunca se reescriben.
pub fn is_bare(request: &str) -> bool {
    !request.starts_with('.')
        && !request.starts_with('/')
        && !request.starts_with(std::path::MAIN_SEPARATOR)
}

/// Si la ruta parece un archivo (tiene extensión), devuelve su directorio.
pub fn strip_to_dir(path: &Path) -> &Path {
    if path.extension().is_some() {
        path.parent().unwrap_or(path)
    } else {
        path
    }
}

/// Como `Path::parent()`, pero devuelve `None` al agotar la jerarquía,
/// para que los bucles de ascenso terminen de forma determinista.
pub fn parent_if(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

/// La raíz del sistema de archivos a la que pertenece `path`.
pub fn fs_root_of(path: &Path) -> PathBuf {
    let root = path.ancestors().last().unwrap_or(Path::new("/"));
    if root.as_os_str().is_empty() {
        PathBuf::from(std::path::MAIN_SEPARATOR.to_string())
    } else {
        root.to_path_buf()
    }
}

/// Normalización léxica: elimina `.` y resuelve `..` sin tocar el disco.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // En la raíz, `..` no sube más.
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(Component::ParentDir),
            },
            other => out.push(other),
        }
    }
    out
}

/// Hace absoluta una ruta producida por una regla, relativa al directorio
/// base del contexto. Un contexto con base vacía (el global) resuelve contra
/// el directorio de trabajo actual.
pub fn resolve_in(base: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        return normalize(p);
    }
    if base.as_os_str().is_empty() {
        return match env::current_dir() {
            Ok(cwd) => normalize(&cwd.join(p)),
            Err(_) => normalize(p),
        };
    }
    normalize(&base.join(p))
}
