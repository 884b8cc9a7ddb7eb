use std::sync::LazyLock;

use regex::Regex;

use crate::models::Section;

/// Keyword rules, evaluated top to bottom; the first match wins, so the
/// order is part of the contract (e.g. "pollo congelado" is butchery, not
/// frozen). Anything unmatched lands in the pantry. [`Section::Other`] is
/// never inferred; it only appears when a recipe tags an ingredient
/// explicitly.
const RULES: &[(Section, &str)] = &[
    (
        Section::Fishmonger,
        r"salm[oó]n|at[uú]n|merluza|bacalao|gambas?|langostino|calamar|sepia|pulpo|sardina|anchoa|lubina|dorada|trucha|rape|mejill[oó]n|almeja|pescado|marisco",
    ),
    (
        Section::Butchery,
        r"pollo|pavo|ternera|cerdo|jam[oó]n|chorizo|salchich|carne|filete|pechuga|muslo|lomo|costilla|cordero|conejo|hamburguesa",
    ),
    (
        Section::FreshProduce,
        r"manzana|pl[aá]tano|banana|naranja|lim[oó]n|fresa|ar[aá]ndano|frambuesa|uva|mel[oó]n|sand[ií]a|pi[ñn]a|kiwi|mango|aguacate|tomate|lechuga|espinaca|cebolla|ajo|zanahoria|pimiento|calabac[ií]n|br[oó]coli|coliflor|pepino|berenjena|champi[ñn][oó]n|seta|patata|boniato|fruta|verdura|perejil|cilantro|albahaca|r[uú]cula|acelga|apio|puerro|jud[ií]a verde|remolacha|r[aá]bano|nabo|col |repollo|end[ií]via",
    ),
    (
        Section::Dairy,
        r"leche|yogur|queso|nata|mantequilla|crema|kefir|cuajada|reques[oó]n|mozzarella|parmesano|ricotta|cottage|skyr",
    ),
    (
        Section::Bakery,
        r"pan |pan$|tostada|baguette|chapata|integral|centeno|tortilla de trigo|wrap|pita|croissant|boller[ií]a|galleta",
    ),
    (Section::Frozen, r"congelad|helado"),
];

static COMPILED: LazyLock<Vec<(Section, Regex)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|&(section, pattern)| {
            let re = Regex::new(pattern).expect("static classifier pattern");
            (section, re)
        })
        .collect()
});

/// Guess the store section for an ingredient name.
///
/// A keyword heuristic, not a food ontology: uncommon items fall through to
/// [`Section::Pantry`] and stay there. Matching is done on the lowercased
/// name, so casing never affects the result.
#[must_use]
pub fn classify(name: &str) -> Section {
    let name = name.to_lowercase();
    for (section, re) in COMPILED.iter() {
        if re.is_match(&name) {
            return *section;
        }
    }
    Section::Pantry
}
