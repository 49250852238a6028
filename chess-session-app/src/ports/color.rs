/// Decides colours when an invitation is accepted.
pub trait ColorPicker {
    /// `true` when the inviting user gets white.
    fn inviter_plays_white(&self) -> bool;
}

pub struct CoinFlipColorPicker;

impl ColorPicker for CoinFlipColorPicker {
    fn inviter_plays_white(&self) -> bool {
        rand::random::<bool>()
    }
}

#[cfg(test)]
pub mod fake {
    use super::ColorPicker;

    pub struct FixedColorPicker(pub bool);

    impl ColorPicker for FixedColorPicker {
        fn inviter_plays_white(&self) -> bool {
            self.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_flip_produces_both_colours() {
        let picker = CoinFlipColorPicker;
        let flips: Vec<bool> = (0..200).map(|_| picker.inviter_plays_white()).collect();
        assert!(flips.iter().any(|white| *white));
        assert!(flips.iter().any(|white| !*white));
    }
}
