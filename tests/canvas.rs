mod tests {
    use pixelweave::{
        addressing::{FanLayout, Layout, PixelOrder, StripLayout},
        canvas::{Canvas, subpixel_taps},
        color::{BLACK, Rgb, WHITE},
    };

    const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };

    fn total_red(pixels: &[Rgb]) -> u32 {
        pixels.iter().map(|p| u32::from(p.r)).sum()
    }

    #[test]
    fn test_subpixel_weights_sum_to_one() {
        let mut y = 0.0f32;
        while y < 2.0 {
            let mut x = 0.0f32;
            while x < 2.0 {
                let sum: u32 = subpixel_taps(x, y)
                    .iter()
                    .map(|tap| u32::from(tap.weight))
                    .sum();
                assert!((253..=257).contains(&sum), "({x}, {y}) sums to {sum}");
                x += 0.07;
            }
            y += 0.11;
        }
    }

    #[test]
    fn test_subpixel_taps_layout() {
        let taps = subpixel_taps(2.5, 1.25);
        assert_eq!((taps[0].x, taps[0].y), (2, 1));
        assert_eq!((taps[3].x, taps[3].y), (3, 2));
        assert!(taps[0].weight > taps[2].weight);

        let whole = subpixel_taps(3.0, 1.0);
        assert_eq!(whole[0].weight, 255);
        assert_eq!(whole[1].weight, 0);
    }

    #[test]
    fn test_splat_conserves_energy() {
        let layout = Layout::matrix(4, 4);
        let mut buf = [BLACK; 16];
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.splat_subpixel(1.5, 1.5, RED);
        }
        let total = total_red(&buf);
        assert!((250..=260).contains(&total), "total {total}");
        assert!(buf[5].r > 0 && buf[6].r > 0 && buf[9].r > 0 && buf[10].r > 0);
    }

    #[test]
    fn test_splat_skips_off_canvas_corners() {
        let layout = Layout::matrix(4, 4);
        let mut buf = [BLACK; 16];
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.splat_subpixel(-0.5, -0.5, RED);
            canvas.splat_subpixel(3.5, 3.5, RED);
            canvas.splat_subpixel(100.0, -40.0, RED);
        }
        assert!(buf[0].r > 0);
        assert!(buf[15].r > 0);
        assert_eq!(total_red(&buf[1..15]), 0);
    }

    #[test]
    fn test_saturating_writes() {
        let layout = Layout::strip(4);
        let mut buf = [Rgb { r: 200, g: 0, b: 0 }; 4];
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.add_pixel(1, Rgb { r: 100, g: 5, b: 0 });
            canvas.set_pixel(2, WHITE);
            canvas.set_pixel(7, WHITE);
            canvas.add_pixel(-3, WHITE);
        }
        assert_eq!(buf[1], Rgb { r: 255, g: 5, b: 0 });
        assert_eq!(buf[2], WHITE);
        assert_eq!(buf[0], Rgb { r: 200, g: 0, b: 0 });
    }

    #[test]
    fn test_fade_all_by() {
        let layout = Layout::strip(3);
        let mut buf = [WHITE, RED, Rgb { r: 3, g: 2, b: 1 }];
        let original = buf;
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.fade_all_by(0);
        }
        assert_eq!(buf, original);

        for _ in 0..300 {
            let before = buf;
            {
                let mut channels = [&mut buf[..]];
                let mut canvas = Canvas::new(&mut channels, &layout);
                canvas.fade_all_by(1);
            }
            for (now, then) in buf.iter().zip(before.iter()) {
                assert!(now.r < then.r || then.r == 0);
            }
        }
        assert_eq!(buf, [BLACK; 3]);
    }

    #[test]
    fn test_writes_reach_every_channel_and_mirror() {
        let layout = Layout::Strip(StripLayout::new(6).with_mirrored(true));
        let mut first = [BLACK; 6];
        let mut second = [BLACK; 6];
        {
            let mut channels = [&mut first[..], &mut second[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            assert_eq!(canvas.channel_count(), 2);
            canvas.set_pixel(1, RED);
        }
        for buf in [first, second] {
            assert_eq!(buf[1], RED);
            assert_eq!(buf[4], RED);
            assert_eq!(total_red(&buf), 510);
        }
    }

    #[test]
    fn test_short_channel_is_skipped_not_overrun() {
        let layout = Layout::strip(6);
        let mut long = [BLACK; 6];
        let mut short = [BLACK; 2];
        {
            let mut channels = [&mut long[..], &mut short[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.fill(RED);
        }
        assert_eq!(long, [RED; 6]);
        assert_eq!(short, [RED; 2]);
    }

    #[test]
    fn test_fractional_span() {
        let layout = Layout::strip(6);
        let mut buf = [BLACK; 6];
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.set_pixels_f(1.5, 2.0, WHITE, false);
        }
        assert_eq!(buf[0], BLACK);
        assert_eq!(buf[1].r, 127);
        assert_eq!(buf[2], WHITE);
        assert_eq!(buf[3].r, 127);
        assert_eq!(buf[4], BLACK);
    }

    #[test]
    fn test_fractional_span_clipped_at_edges() {
        let layout = Layout::strip(4);
        let mut buf = [BLACK; 4];
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.set_pixels_f(-1.0, 2.0, WHITE, false);
            canvas.set_pixels_f(3.0, 5.0, RED, false);
        }
        assert_eq!(buf, [WHITE, BLACK, BLACK, RED]);
    }

    #[test]
    fn test_fan_and_ring_drawing() {
        let layout = Layout::Fans(FanLayout::new(2, 12, &[8, 4], 0).unwrap());
        let mut buf = [BLACK; 24];
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.draw_fan_pixels(0.0, 2.0, RED, PixelOrder::Reverse, 1);
            canvas.draw_ring_pixels(3.0, 2.0, WHITE, 0, 1, false);
            // Past the end of the last fan
            canvas.draw_fan_pixels(11.0, 4.0, WHITE, PixelOrder::Sequential, 1);
        }
        assert_eq!(buf[23], RED);
        assert_eq!(buf[22], RED);
        assert_eq!(buf[11], WHITE);
        assert_eq!(buf[8], WHITE);
        assert_eq!(total_red(&buf), 255 * 2 + 255 * 2);
    }

    #[test]
    fn test_fan_drawing_ignored_on_strips() {
        let layout = Layout::strip(8);
        let mut buf = [BLACK; 8];
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.draw_fan_pixels(0.0, 2.0, RED, PixelOrder::Sequential, 0);
        }
        assert_eq!(buf, [BLACK; 8]);
    }

    #[test]
    fn test_blur_rows_spreads_light() {
        let layout = Layout::strip(5);
        let mut buf = [BLACK; 5];
        buf[2] = WHITE;
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.blur_rows(128);
        }
        assert!(buf[1].r > 0);
        assert!(buf[3].r > 0);
        assert!(buf[2].r < 255);
        assert_eq!(buf[0], BLACK);
    }

    #[test]
    fn test_far_off_canvas_splats_are_ignored() {
        let layout = Layout::matrix(4, 4);
        let mut buf = [BLACK; 16];
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.splat_subpixel(3.0e9, 0.5, RED);
            canvas.splat_subpixel(0.5, 3.0e9, RED);
            canvas.splat_subpixel(-3.0e9, -3.0e9, RED);
            canvas.splat_subpixel(f32::NAN, 1.0, RED);
            canvas.splat_subpixel(f32::INFINITY, f32::NEG_INFINITY, RED);
        }
        assert_eq!(buf, [BLACK; 16]);

        let taps = subpixel_taps(3.0e9, 3.0e9);
        assert_eq!(taps[3].x, i32::MAX);
    }

    #[test]
    fn test_non_finite_spans_are_ignored() {
        let layout = Layout::strip(4);
        let mut buf = [BLACK; 4];
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.set_pixels_f(f32::NAN, 1.0e30, RED, false);
            canvas.set_pixels_f(0.0, f32::NAN, RED, false);
            canvas.set_pixels_f(3.0e9, 2.0, RED, false);
        }
        assert_eq!(buf, [BLACK; 4]);
    }

    #[test]
    fn test_ring_spans_wrap_from_any_position() {
        let layout = Layout::Fans(FanLayout::new(2, 12, &[8, 4], 0).unwrap());
        let mut buf = [BLACK; 24];
        {
            let mut channels = [&mut buf[..]];
            let mut canvas = Canvas::new(&mut channels, &layout);
            canvas.draw_ring_pixels(3.0e9, 2.0, RED, 0, 1, false);
            canvas.draw_ring_pixels(-1.0, 2.0, WHITE, 1, 1, false);
            canvas.draw_ring_pixels(f32::NAN, 2.0, WHITE, 0, 0, false);
        }
        assert_eq!(buf[8], RED);
        assert_eq!(buf[9], RED);
        assert_eq!(buf[23], WHITE);
        assert_eq!(buf[20], WHITE);
        assert_eq!(total_red(&buf), 255 * 4);
    }
}
