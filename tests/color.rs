mod tests {
    use pixelweave::color::{
        BLACK, BlendMode, Palette, PaletteError, Rgb, WHITE, blend_colors, fade_to_black_by,
        rgb_from_u32, rgb_to_u32, saturating_add,
    };

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
    const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };

    #[test]
    fn test_blend_colors() {
        assert_eq!(blend_colors(RED, BLUE, 0), RED);
        assert_eq!(blend_colors(RED, BLUE, 255), BLUE);
        assert_eq!(
            blend_colors(RED, BLUE, 128),
            Rgb {
                r: 127,
                g: 0,
                b: 128
            }
        );

        assert_eq!(
            blend_colors(BLACK, WHITE, 128),
            Rgb {
                r: 128,
                g: 128,
                b: 128
            }
        );
        assert_eq!(blend_colors(WHITE, BLACK, 255), BLACK);
        assert_eq!(blend_colors(WHITE, BLACK, 0), WHITE);
    }

    #[test]
    fn test_hex_conversion() {
        let color = rgb_from_u32(0x12_34_56);
        assert_eq!(
            color,
            Rgb {
                r: 0x12,
                g: 0x34,
                b: 0x56
            }
        );
        assert_eq!(rgb_to_u32(color), 0x12_34_56);
    }

    #[test]
    fn test_saturating_add_never_overflows() {
        let values = [0u8, 1, 17, 100, 128, 200, 254, 255];
        for &a in &values {
            for &b in &values {
                let dst = Rgb { r: a, g: b, b: a };
                let src = Rgb { r: b, g: a, b: b };
                let sum = saturating_add(dst, src);
                assert!(sum.r >= a.max(b));
                assert!(sum.g >= a.max(b));
                assert!(sum.b >= a.max(b));
                assert_eq!(u16::from(sum.r), (u16::from(a) + u16::from(b)).min(255));
            }
        }
    }

    #[test]
    fn test_fade_to_black_by() {
        assert_eq!(fade_to_black_by(WHITE, 0), WHITE);

        let mut color = WHITE;
        for _ in 0..300 {
            let next = fade_to_black_by(color, 1);
            assert!(next.r < color.r || color.r == 0);
            color = next;
        }
        assert_eq!(color, BLACK);

        assert_eq!(fade_to_black_by(Rgb { r: 1, g: 1, b: 1 }, 1), BLACK);
    }

    #[test]
    fn test_palette_rejects_bad_sizes() {
        assert_eq!(Palette::new(&[], BlendMode::Linear), Err(PaletteError::Empty));
        let big = [RED; 257];
        assert_eq!(
            Palette::new(&big, BlendMode::Linear),
            Err(PaletteError::TooLarge(257))
        );
        assert!(Palette::new(&[RED; 256], BlendMode::Linear).is_ok());
    }

    #[test]
    fn test_palette_entry_boundaries_are_exact() {
        let palette = Palette::rainbow();
        assert_eq!(palette.len(), 16);
        for (k, entry) in palette.entries().iter().enumerate() {
            let index = u8::try_from(k * 16).unwrap();
            assert_eq!(palette.sample(index, 255), *entry);
        }

        let four = Palette::new(&[BLACK, RED, BLUE, WHITE], BlendMode::Linear).unwrap();
        assert_eq!(four.sample(0, 255), BLACK);
        assert_eq!(four.sample(64, 255), RED);
        assert_eq!(four.sample(128, 255), BLUE);
        assert_eq!(four.sample(192, 255), WHITE);
    }

    #[test]
    fn test_palette_ramps_toward_red() {
        let palette = Palette::new(&[BLACK, RED, BLACK], BlendMode::Linear).unwrap();
        assert_eq!(palette.sample(0, 255), BLACK);

        let quarter = palette.sample(64, 255);
        assert!(quarter.r > 0 && quarter.r < 255);
        assert_eq!((quarter.g, quarter.b), (0, 0));

        let mut last = 0;
        for index in 0..=85u8 {
            let red = palette.sample(index, 255).r;
            assert!(red >= last, "red dropped at index {index}");
            last = red;
        }
    }

    #[test]
    fn test_palette_wraps_to_first_entry() {
        let palette = Palette::new(&[RED, BLUE], BlendMode::Linear).unwrap();
        let near_end = palette.sample(255, 255);
        assert!(near_end.r > near_end.b);
    }

    #[test]
    fn test_palette_without_blending_picks_nearest() {
        let palette = Palette::new(&[RED, BLUE], BlendMode::None).unwrap();
        assert_eq!(palette.sample(10, 255), RED);
        assert_eq!(palette.sample(100, 255), BLUE);
        assert_eq!(palette.sample(128, 255), BLUE);
        assert_eq!(palette.sample_with(10, 255, BlendMode::Linear).b, 20);
    }

    #[test]
    fn test_palette_brightness() {
        let palette = Palette::new(&[WHITE], BlendMode::Linear).unwrap();
        assert_eq!(palette.sample(99, 0), BLACK);
        assert_eq!(palette.sample(99, 255), WHITE);
        assert_eq!(palette.sample(99, 127).r, 127);
    }

    #[test]
    fn test_palette_serde() {
        let palette = Palette::from_hex(&[0xFF_00_00, 0x00_00_FF], BlendMode::Linear).unwrap();
        let value = serde_json::to_value(&palette).unwrap();
        assert_eq!(value, serde_json::json!([0xFF_00_00, 0x00_00_FF]));

        let back: Palette = serde_json::from_value(value).unwrap();
        assert_eq!(back, palette);
        assert!(serde_json::from_value::<Palette>(serde_json::json!([])).is_err());
    }
}
