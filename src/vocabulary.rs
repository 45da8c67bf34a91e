//! The fixed vocabulary mapping human-readable flower names to addresses.
//!
//! Carried over from `original_source/main.py`'s `flores` list, which
//! assigns each of 128 flower names to a position `0..128` by declaration
//! order. This module is pure data plus pure lookups; it has no dependency
//! on the coherence engine.

use crate::address::{Address, N_ADDRESSES};

/// The 128 flower names, in the address order they name.
pub const FLOWERS: [&str; N_ADDRESSES] = [
    "rosa", "tulipa", "orquidea", "girassol", "lirio", "dalia", "azaleia", "cravo", "violeta",
    "hortensia", "camelia", "jasmim", "begonia", "amarilis", "gerbera", "peonia", "petunia",
    "magnolia", "copo-de-leite", "margarida", "narciso", "lotus", "gladiolo", "anturio", "hibisco",
    "flor-de-lis", "ipe", "cerejeira", "verbena", "alecrim", "lavanda", "manaca", "cravina",
    "camomila", "girassol-do-campo", "bromelia", "ciclame", "calendula", "estrelicia",
    "flor-de-maio", "freesia", "azucena", "anis", "trevo", "salvia", "buganvilia", "edelvaisse",
    "cactos", "flor-de-maracuja", "gengibre", "gloxinia", "ipe-amarelo", "jasmim-manga",
    "tagetes", "magnolia-branca", "papoula", "maranta", "murta", "nevoa", "orquidea-negra",
    "primavera", "rabo-de-galo", "salvia-branca", "tomilho", "urze", "verbena-roxa", "viuvinha",
    "ylang-ylang", "cravo-vermelho", "jasmim-estrela", "lirio-do-vale", "madressilva", "mimosa",
    "onze-horas", "orquidea-bambu", "orquidea-chocolate", "orquidea-fantasma", "orquidea-vanila",
    "paixao-flor", "papoula-californiana", "pata-de-vaca", "primavera-roxa", "raiz-de-ouro",
    "rosa-do-deserto", "rosa-mistica", "silene", "stevia-flor", "tajete", "trapoeraba",
    "trevo-roxo", "baunilha", "trombeta-dourada", "valeriana", "veronica", "viburno",
    "viola-tricolor", "xerantemo", "zinia", "angelonia", "astromelia", "belladona",
    "cana-da-india", "cineraria", "cosmos", "dianthus", "dulcamara", "echinacea", "esponjinha",
    "flor-borboleta", "flor-de-cera", "flor-de-coral", "flor-de-iris", "gazania", "geranio",
    "heliconia", "jasmim-do-cabo", "lantana", "malva", "melissa", "mirabilis", "nespera-florida",
    "no-me-esquecas", "orquidea-tigre", "pervinca", "ranunculo", "sapatinho-de-judia", "trebol",
    "uvaia-florida",
];

/// Resolve a flower name (case-insensitive) to its address. Returns `None`
/// if the name is not in the catalogue.
pub fn name_to_address(name: &str) -> Option<Address> {
    let needle = name.trim().to_lowercase();
    FLOWERS
        .iter()
        .position(|flower| *flower == needle)
        .and_then(|index| Address::new(index).ok())
}

/// The flower name for a given address.
pub fn address_to_name(address: Address) -> &'static str {
    FLOWERS[address.index()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_has_exactly_n_addresses_entries() {
        assert_eq!(FLOWERS.len(), N_ADDRESSES);
    }

    #[test]
    fn names_are_unique() {
        let mut sorted = FLOWERS.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), FLOWERS.len());
    }

    #[test]
    fn lookup_is_case_insensitive_and_roundtrips() {
        let addr = name_to_address("ROSA").unwrap();
        assert_eq!(addr, Address::new(0).unwrap());
        assert_eq!(address_to_name(addr), "rosa");
    }

    #[test]
    fn unknown_flower_is_none() {
        assert_eq!(name_to_address("not-a-flower"), None);
    }
}
