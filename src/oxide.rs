//! The fixed set of oxides the dataset carries.
//!
//! Each oxide maps to exactly one column header in the input table. The
//! mapping is an explicit table so a missing column is caught at load time
//! instead of surfacing as a silent lookup failure.

/// Oxides whose weight-percent content can be displayed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Oxide {
    #[default]
    TiO2,
    Al2O3,
    FeOT,
    CaO,
    MnO,
    Na2O,
    MgO,
}

impl Oxide {
    /// Number of supported oxides.
    pub const COUNT: usize = 7;

    /// All oxides in selection order. The first entry is the default.
    pub const ALL: [Oxide; Self::COUNT] = [
        Oxide::TiO2,
        Oxide::Al2O3,
        Oxide::FeOT,
        Oxide::CaO,
        Oxide::MnO,
        Oxide::Na2O,
        Oxide::MgO,
    ];

    /// Display name as shown in the selection control.
    pub fn name(&self) -> &'static str {
        match self {
            Oxide::TiO2 => "TiO2",
            Oxide::Al2O3 => "Al2O3",
            Oxide::FeOT => "FeOT",
            Oxide::CaO => "CaO",
            Oxide::MnO => "MnO",
            Oxide::Na2O => "Na2O",
            Oxide::MgO => "MGO",
        }
    }

    /// Column header in the input table: upper-cased name plus `(WT%)`.
    pub fn column(&self) -> &'static str {
        match self {
            Oxide::TiO2 => "TIO2(WT%)",
            Oxide::Al2O3 => "AL2O3(WT%)",
            Oxide::FeOT => "FEOT(WT%)",
            Oxide::CaO => "CAO(WT%)",
            Oxide::MnO => "MNO(WT%)",
            Oxide::Na2O => "NA2O(WT%)",
            Oxide::MgO => "MGO(WT%)",
        }
    }

    /// Index into per-sample value storage.
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_first_entry() {
        assert_eq!(Oxide::default(), Oxide::ALL[0]);
        assert_eq!(Oxide::default(), Oxide::TiO2);
    }

    #[test]
    fn columns_are_uppercased_wt_percent() {
        for oxide in Oxide::ALL {
            let column = oxide.column();
            assert!(column.ends_with("(WT%)"), "{column}");
            assert_eq!(column, column.to_uppercase());
            assert!(column.starts_with(&oxide.name().to_uppercase()));
        }
    }

    #[test]
    fn indices_match_selection_order() {
        for (i, oxide) in Oxide::ALL.into_iter().enumerate() {
            assert_eq!(oxide.index(), i);
        }
    }
}
