//! User-facing catalog messages (Spanish, as shown by the admin UI).

pub const DESCRIPTION_REQUIRED: &str = "La descripción es requerida";
pub const DESCRIPTION_INVALID_CHARS: &str =
    "La descripción solo puede contener letras, números, espacios, apostrofes y guiones";
pub const DESCRIPTION_TOO_LONG: &str = "La descripción no puede superar 100 caracteres";

pub const CREATED: &str = "Tipo de catálogo creado exitosamente";
pub const UPDATED: &str = "Tipo de catálogo actualizado exitosamente";
pub const REMOVED: &str = "Tipo de catálogo eliminado exitosamente";

pub const LOAD_FAILED: &str = "Error al cargar los tipos de catálogo";
pub const SAVE_FAILED: &str = "Error al guardar el tipo de catálogo";
pub const REMOVE_FAILED: &str = "Error al eliminar el tipo de catálogo";

/// Shown when removal is refused because the type still classifies products.
pub fn removal_blocked(description: &str, number_of_products: u64) -> String {
    format!(
        "No se puede eliminar el tipo \"{description}\" porque está en uso por \
         {number_of_products} producto(s)."
    )
}

/// Destructive-action confirmation prompt for an unused type.
pub fn removal_prompt(description: &str) -> String {
    format!(
        "¿Estás seguro de eliminar el tipo de catálogo \"{description}\"?\n\n\
         Este tipo será eliminado permanentemente del sistema.\n\n\
         ¿Deseas continuar?"
    )
}

/// Use the service-reported message verbatim, or `fallback` when it is blank.
pub fn or_fallback(message: &str, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}
