/// Embedded element table.
///
/// Each entry: (Z, symbol, name, standard atomic weight in u). Elements
/// without a standard weight carry the mass number of their longest-lived
/// isotope.
pub(crate) const ELEMENTS: &[(u16, &str, &str, f64)] = &[
    (1, "H", "hydrogen", 1.00794),
    (2, "He", "helium", 4.002602),
    (3, "Li", "lithium", 6.941),
    (4, "Be", "beryllium", 9.012182),
    (5, "B", "boron", 10.811),
    (6, "C", "carbon", 12.0107),
    (7, "N", "nitrogen", 14.0067),
    (8, "O", "oxygen", 15.9994),
    (9, "F", "fluorine", 18.9984032),
    (10, "Ne", "neon", 20.1797),
    (11, "Na", "sodium", 22.98976928),
    (12, "Mg", "magnesium", 24.305),
    (13, "Al", "aluminum", 26.9815386),
    (14, "Si", "silicon", 28.0855),
    (15, "P", "phosphorus", 30.973762),
    (16, "S", "sulfur", 32.065),
    (17, "Cl", "chlorine", 35.453),
    (18, "Ar", "argon", 39.948),
    (19, "K", "potassium", 39.0983),
    (20, "Ca", "calcium", 40.078),
    (21, "Sc", "scandium", 44.955912),
    (22, "Ti", "titanium", 47.867),
    (23, "V", "vanadium", 50.9415),
    (24, "Cr", "chromium", 51.9961),
    (25, "Mn", "manganese", 54.938045),
    (26, "Fe", "iron", 55.845),
    (27, "Co", "cobalt", 58.933195),
    (28, "Ni", "nickel", 58.6934),
    (29, "Cu", "copper", 63.546),
    (30, "Zn", "zinc", 65.38),
    (31, "Ga", "gallium", 69.723),
    (32, "Ge", "germanium", 72.64),
    (33, "As", "arsenic", 74.9216),
    (34, "Se", "selenium", 78.96),
    (35, "Br", "bromine", 79.904),
    (36, "Kr", "krypton", 83.798),
    (37, "Rb", "rubidium", 85.4678),
    (38, "Sr", "strontium", 87.62),
    (39, "Y", "yttrium", 88.90585),
    (40, "Zr", "zirconium", 91.224),
    (41, "Nb", "niobium", 92.90638),
    (42, "Mo", "molybdenum", 95.96),
    (43, "Tc", "technetium", 98.0),
    (44, "Ru", "ruthenium", 101.07),
    (45, "Rh", "rhodium", 102.9055),
    (46, "Pd", "palladium", 106.42),
    (47, "Ag", "silver", 107.8682),
    (48, "Cd", "cadmium", 112.411),
    (49, "In", "indium", 114.818),
    (50, "Sn", "tin", 118.71),
    (51, "Sb", "antimony", 121.76),
    (52, "Te", "tellurium", 127.6),
    (53, "I", "iodine", 126.90447),
    (54, "Xe", "xenon", 131.293),
    (55, "Cs", "cesium", 132.9054519),
    (56, "Ba", "barium", 137.327),
    (57, "La", "lanthanum", 138.90547),
    (58, "Ce", "cerium", 140.116),
    (59, "Pr", "praseodymium", 140.90765),
    (60, "Nd", "neodymium", 144.242),
    (61, "Pm", "promethium", 145.0),
    (62, "Sm", "samarium", 150.36),
    (63, "Eu", "europium", 151.964),
    (64, "Gd", "gadolinium", 157.25),
    (65, "Tb", "terbium", 158.92535),
    (66, "Dy", "dysprosium", 162.5),
    (67, "Ho", "holmium", 164.93032),
    (68, "Er", "erbium", 167.259),
    (69, "Tm", "thulium", 168.93421),
    (70, "Yb", "ytterbium", 173.054),
    (71, "Lu", "lutetium", 174.9668),
    (72, "Hf", "hafnium", 178.49),
    (73, "Ta", "tantalum", 180.94788),
    (74, "W", "tungsten", 183.84),
    (75, "Re", "rhenium", 186.207),
    (76, "Os", "osmium", 190.23),
    (77, "Ir", "iridium", 192.217),
    (78, "Pt", "platinum", 195.084),
    (79, "Au", "gold", 196.966569),
    (80, "Hg", "mercury", 200.59),
    (81, "Tl", "thallium", 204.3833),
    (82, "Pb", "lead", 207.2),
    (83, "Bi", "bismuth", 208.9804),
    (84, "Po", "polonium", 209.0),
    (85, "At", "astatine", 210.0),
    (86, "Rn", "radon", 222.0),
    (87, "Fr", "francium", 223.0),
    (88, "Ra", "radium", 226.0),
    (89, "Ac", "actinium", 227.0),
    (90, "Th", "thorium", 232.03806),
    (91, "Pa", "protactinium", 231.03588),
    (92, "U", "uranium", 238.02891),
    (93, "Np", "neptunium", 237.0),
    (94, "Pu", "plutonium", 244.0),
    (95, "Am", "americium", 243.0),
    (96, "Cm", "curium", 247.0),
    (97, "Bk", "berkelium", 247.0),
    (98, "Cf", "californium", 251.0),
    (99, "Es", "einsteinium", 252.0),
    (100, "Fm", "fermium", 257.0),
    (101, "Md", "mendelevium", 258.0),
    (102, "No", "nobelium", 259.0),
    (103, "Lr", "lawrencium", 262.0),
    (104, "Rf", "rutherfordium", 267.0),
    (105, "Db", "dubnium", 268.0),
    (106, "Sg", "seaborgium", 271.0),
    (107, "Bh", "bohrium", 272.0),
    (108, "Hs", "hassium", 270.0),
    (109, "Mt", "meitnerium", 276.0),
    (110, "Ds", "darmstadtium", 281.0),
    (111, "Rg", "roentgenium", 280.0),
    (112, "Cn", "copernicium", 285.0),
    (113, "Nh", "nihonium", 284.0),
    (114, "Fl", "flerovium", 289.0),
    (115, "Mc", "moscovium", 288.0),
    (116, "Lv", "livermorium", 293.0),
    (117, "Ts", "tennessine", 294.0),
    (118, "Og", "oganesson", 294.0),
];

/// Provisional and systematic symbols still found in older inputs.
pub(crate) const LEGACY_SYMBOLS: &[(&str, u16)] = &[
    ("Cp", 112),
    ("Uub", 112),
    ("Uut", 113),
    ("Uuq", 114),
    ("Uup", 115),
    ("Uuh", 116),
    ("Uus", 117),
    ("Uuo", 118),
];
