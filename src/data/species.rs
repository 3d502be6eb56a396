use crate::data::types::Type;
use crate::sim::stats::BaseStats;
use phf::phf_map;

#[derive(Clone, Copy, Debug)]
pub struct SpeciesData {
    pub name: &'static str,
    pub types: (Type, Option<Type>),
    pub base_stats: BaseStats,
}

macro_rules! species {
    ($name:expr, $t1:ident, $t2:expr, [$hp:expr, $atk:expr, $def:expr, $spa:expr, $spd:expr, $spe:expr]) => {
        SpeciesData {
            name: $name,
            types: (Type::$t1, $t2),
            base_stats: BaseStats {
                hp: $hp,
                atk: $atk,
                def: $def,
                spa: $spa,
                spd: $spd,
                spe: $spe,
            },
        }
    };
}

pub static POKEDEX: phf::Map<&'static str, SpeciesData> = phf_map! {
    "bulbasaur" => species!("Bulbasaur", Grass, Some(Type::Poison), [45, 49, 49, 65, 65, 45]),
    "venusaur" => species!("Venusaur", Grass, Some(Type::Poison), [80, 82, 83, 100, 100, 80]),
    "charmander" => species!("Charmander", Fire, None, [39, 52, 43, 60, 50, 65]),
    "charizard" => species!("Charizard", Fire, Some(Type::Flying), [78, 84, 78, 109, 85, 100]),
    "squirtle" => species!("Squirtle", Water, None, [44, 48, 65, 50, 64, 43]),
    "blastoise" => species!("Blastoise", Water, None, [79, 83, 100, 85, 105, 78]),
    "pikachu" => species!("Pikachu", Electric, None, [35, 55, 40, 50, 50, 90]),
    "raichu" => species!("Raichu", Electric, None, [60, 90, 55, 90, 80, 110]),
    "gengar" => species!("Gengar", Ghost, Some(Type::Poison), [60, 65, 60, 130, 75, 110]),
    "alakazam" => species!("Alakazam", Psychic, None, [55, 50, 45, 135, 95, 120]),
    "machamp" => species!("Machamp", Fighting, None, [90, 130, 80, 65, 85, 55]),
    "onix" => species!("Onix", Rock, Some(Type::Ground), [35, 45, 160, 30, 45, 70]),
    "gyarados" => species!("Gyarados", Water, Some(Type::Flying), [95, 125, 79, 60, 100, 81]),
    "lapras" => species!("Lapras", Water, Some(Type::Ice), [130, 85, 80, 85, 95, 60]),
    "snorlax" => species!("Snorlax", Normal, None, [160, 110, 65, 65, 110, 30]),
    "dragonite" => species!("Dragonite", Dragon, Some(Type::Flying), [91, 134, 95, 100, 100, 80]),
    "mewtwo" => species!("Mewtwo", Psychic, None, [106, 110, 90, 154, 90, 130]),
    "scizor" => species!("Scizor", Bug, Some(Type::Steel), [70, 130, 100, 55, 80, 65]),
    "tyranitar" => species!("Tyranitar", Rock, Some(Type::Dark), [100, 134, 110, 95, 100, 61]),
    "garchomp" => species!("Garchomp", Dragon, Some(Type::Ground), [108, 130, 95, 80, 85, 102]),
    "lucario" => species!("Lucario", Fighting, Some(Type::Steel), [70, 110, 70, 115, 70, 90]),
    "sylveon" => species!("Sylveon", Fairy, None, [95, 65, 65, 110, 130, 60]),
};

pub fn normalize_id(name: &str) -> String {
    name.to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

pub fn get_species(name: &str) -> Option<&'static SpeciesData> {
    POKEDEX.get(normalize_id(name).as_str())
}
