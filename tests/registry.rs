mod tests {
    use pixelweave::{
        EffectError,
        effect::{
            BubblyStar, ClassicFireConfig, ClassicFireEffect, ColorBeatConfig, ColorBeatEffect,
            ColorFillConfig, ColorFillEffect, Effect, EffectId, EffectRegistry, PaletteConfig,
            PaletteEffect, RainbowFillConfig, RainbowFillEffect, SparkleStar, StarryNightConfig,
            StarryNightEffect, WanderingDotsConfig, WanderingDotsEffect, builtin_registry,
        },
        record::Record,
        BlendMode, Palette, Rgb,
    };
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn assert_round_trip(registry: &EffectRegistry, effect: &dyn Effect) {
        let first = effect.serialize().unwrap();
        let rebuilt = registry
            .create_from_record(&first)
            .unwrap_or_else(|| panic!("effect {} not rebuilt", effect.id()));
        let second = rebuilt.serialize().unwrap();
        assert_eq!(first, second, "record of {} changed", effect.name());
        assert_eq!(rebuilt.id(), effect.id());
    }

    #[test]
    fn test_builtin_ids() {
        let registry = builtin_registry();
        for raw in 1..=7 {
            assert!(registry.contains(EffectId::new(raw)), "id {raw} missing");
        }
        assert!(!registry.contains(EffectId::new(99)));
        assert_eq!(registry.name_of(EffectId::CLASSIC_FIRE), Some("classic fire"));
        assert_eq!(registry.ids().count(), 7);
        assert_eq!(registry.create_defaults().len(), 8);
    }

    #[test]
    fn test_defaults_round_trip() {
        let registry = builtin_registry();
        let ids: Vec<EffectId> = registry.ids().collect();
        for id in ids {
            let effect = registry.create_default(id).unwrap();
            assert_round_trip(&registry, effect.as_ref());
        }
        for effect in registry.create_defaults() {
            assert_round_trip(&registry, effect.as_ref());
        }
    }

    #[test]
    fn test_explicit_params_round_trip() {
        let registry = builtin_registry();
        let palette = Palette::from_hex(&[0x10_20_30, 0xFF_00_80, 0x00_FF_00], BlendMode::Linear)
            .unwrap();

        let mut fill = ColorFillEffect::new(ColorFillConfig {
            color: Rgb { r: 1, g: 2, b: 3 },
            fade_ms: 0,
        });
        fill.base_mut().set_name("Reading");
        fill.base_mut().set_max_effect_time_ms(60_000);

        let mut rainbow = RainbowFillEffect::new(RainbowFillConfig::default()).with_mirrored(true);
        rainbow.base_mut().set_enabled(false);

        let effects: Vec<Box<dyn Effect>> = vec![
            Box::new(fill),
            Box::new(rainbow),
            Box::new(PaletteEffect::new(PaletteConfig {
                palette: palette.clone(),
                blend: BlendMode::None,
                ..PaletteConfig::default()
            })),
            Box::new(ClassicFireEffect::new(ClassicFireConfig {
                cooling: 80,
                sparking: 50,
                mirrored: true,
                ..ClassicFireConfig::default()
            })),
            Box::new(StarryNightEffect::<SparkleStar>::new(StarryNightConfig {
                probability: 2.5,
                blur: 0.3,
                palette: palette.clone(),
                ..StarryNightConfig::default()
            })),
            Box::new(ColorBeatEffect::new(ColorBeatConfig {
                min_range: 0.1,
                fade_time: 0.25,
                ..ColorBeatConfig::default()
            })),
            Box::new(WanderingDotsEffect::new(WanderingDotsConfig {
                count: 3,
                max_speed: 2.5,
                palette,
                ..WanderingDotsConfig::default()
            })),
        ];
        for effect in &effects {
            assert_round_trip(&registry, effect.as_ref());
        }
    }

    #[test]
    fn test_base_fields_in_record() {
        let mut fill = ColorFillEffect::default();
        fill.base_mut().mark_core();
        fill.base_mut().set_enabled(false);
        let record = fill.serialize().unwrap();
        assert_eq!(record.get("en"), Some(&json!(1)));
        assert_eq!(record.get("es"), Some(&json!(0)));
        assert_eq!(record.get("ce"), Some(&json!(true)));
        assert!(record.get("mt").is_none());
        assert_eq!(record.get("cl"), Some(&json!(0xFF_A0_40)));
    }

    #[test]
    fn test_unknown_id_yields_none() {
        let registry = builtin_registry();
        assert!(registry.create_from_record(&record(json!({"en": 4242}))).is_none());
        assert!(registry.create_from_record(&record(json!({"en": "fire"}))).is_none());
        assert!(registry.create_from_record(&record(json!({"fn": "no id"}))).is_none());
        assert!(matches!(
            registry.try_create_from_record(&record(json!({"en": 4242}))),
            Err(EffectError::UnknownEffect(id)) if id == EffectId::new(4242)
        ));
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let registry = builtin_registry();
        let effect = registry
            .create_from_record(&record(json!({"en": 4})))
            .unwrap();
        let written = effect.serialize().unwrap();
        assert_eq!(written.get("coo"), Some(&json!(55)));
        assert_eq!(written.get("es"), Some(&json!(1)));
        assert_eq!(written.get("fn"), Some(&json!("")));
    }

    #[test]
    fn test_wrong_type_rejects_record() {
        let registry = builtin_registry();
        let bad = record(json!({"en": 4, "coo": "hot"}));
        assert!(registry.create_from_record(&bad).is_none());
        assert!(matches!(
            registry.try_create_from_record(&bad),
            Err(EffectError::MalformedRecord(_))
        ));

        let bad_base = record(json!({"en": 1, "es": "yes"}));
        assert!(registry.create_from_record(&bad_base).is_none());
    }

    #[test]
    fn test_non_finite_values_reject_record() {
        let registry = builtin_registry();
        for (value, key) in [
            (json!({"en": 7, "ms": 1e39}), "ms"),
            (json!({"en": 5, "st": 2, "ms": -1e39}), "ms"),
            (json!({"en": 5, "msf": 1e40}), "msf"),
            (json!({"en": 3, "gsz": 1e39}), "gsz"),
            (json!({"en": 6, "fdt": 1e39}), "fdt"),
        ] {
            let bad = record(value);
            assert!(registry.create_from_record(&bad).is_none());
            assert!(
                matches!(
                    registry.try_create_from_record(&bad),
                    Err(EffectError::NonFiniteValue(k)) if k == key
                ),
                "{bad:?} accepted"
            );
        }

        let huge = record(json!({"en": 3, "gsz": 1e8}));
        assert!(registry.create_from_record(&huge).is_some());
    }

    #[test]
    fn test_star_subtypes() {
        let registry = builtin_registry();

        let sparkle = registry
            .create_from_record(&record(json!({"en": 5, "st": 3})))
            .unwrap();
        assert_eq!(sparkle.serialize().unwrap().get("st"), Some(&json!(3)));

        let fallback = registry
            .create_from_record(&record(json!({"en": 5})))
            .unwrap();
        assert_eq!(fallback.serialize().unwrap().get("st"), Some(&json!(1)));

        let bubbly = StarryNightEffect::<BubblyStar>::default();
        assert_eq!(bubbly.serialize().unwrap().get("st"), Some(&json!(4)));

        let unknown = record(json!({"en": 5, "st": 99}));
        assert!(registry.create_from_record(&unknown).is_none());
        assert!(matches!(
            registry.try_create_from_record(&unknown),
            Err(EffectError::UnknownSubtype { subtype: 99, .. })
        ));
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let mut registry = builtin_registry();
        let result = registry.register(
            EffectId::CLASSIC_FIRE,
            "impostor",
            || Box::new(ColorFillEffect::default()),
            |r| Ok(Box::new(ColorFillEffect::from_record(r)?)),
        );
        assert!(matches!(result, Err(EffectError::DuplicateEffect(_))));
        assert_eq!(registry.name_of(EffectId::CLASSIC_FIRE), Some("classic fire"));
        assert_eq!(
            registry.create_default(EffectId::CLASSIC_FIRE).unwrap().id(),
            EffectId::CLASSIC_FIRE
        );
    }
}
