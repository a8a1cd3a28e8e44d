use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpeciesInfo {
    pub label: &'static str,
    pub image: &'static str,
    pub scientific_name: Option<&'static str>,
    pub description: &'static str,
}

const SPECIES: &[SpeciesInfo] = &[
    SpeciesInfo {
        label: "house mouse",
        image: "images/House Mouse.jpg",
        scientific_name: Some("Mus musculus"),
        description: "The house mouse is a small mammal of the order Rodentia; widely used as a model organism.",
    },
    SpeciesInfo {
        label: "brown rat",
        image: "images/Brown Rat.jpg",
        scientific_name: Some("Rattus norvegicus"),
        description: "The brown rat is commonly used in physiology and toxicology research.",
    },
    SpeciesInfo {
        label: "Danio rerio",
        image: "images/Danio rerio.jpg",
        scientific_name: Some("Danio rerio"),
        description: "Zebrafish are a popular developmental and genetic model organism.",
    },
    SpeciesInfo {
        label: "Drosophila melanogaster",
        image: "images/Drosophila melanogaster.jpg",
        scientific_name: Some("Drosophila melanogaster"),
        description: "Fruit fly, the classic genetic model organism.",
    },
    SpeciesInfo {
        label: "Caenorhabditis elegans",
        image: "images/Caenorhabditis elegans.jpg",
        scientific_name: Some("Caenorhabditis elegans"),
        description: "Nematode used extensively in developmental biology and neurobiology.",
    },
    SpeciesInfo {
        label: "Saccharomyces cerevisiae S288c",
        image: "images/Saccharomyces cerevisiae S288c.jpg",
        scientific_name: Some("Saccharomyces cerevisiae"),
        description: "Baker's yeast, a unicellular eukaryote used in many molecular studies.",
    },
];

pub const UNKNOWN_SPECIES: SpeciesInfo = SpeciesInfo {
    label: "",
    image: "images/placeholder.png",
    scientific_name: None,
    description: "No description available.",
};

pub fn species_info(label: &str) -> &'static SpeciesInfo {
    SPECIES
        .iter()
        .find(|info| info.label == label)
        .unwrap_or(&UNKNOWN_SPECIES)
}

pub fn known_species() -> &'static [SpeciesInfo] {
    SPECIES
}
