//! Scene composition: what gets painted for the visualizer and for the game

use super::surface::{DrawStyle, RenderSurface};
use crate::sim::palette;
use crate::sim::{GamePhase, GameSession, Visualizer};

/// Paint the ambient layer: dust, trail points and the links between them
pub fn draw_visualizer<S: RenderSurface + ?Sized>(surface: &mut S, vis: &Visualizer, glow: bool) {
    let halo = |radius: f32| if glow { radius } else { 0.0 };
    surface.clear([0.0; 4]);

    let hue = 250.0 + vis.elapsed().sin() * 60.0;
    let dust = palette::hsl(hue, 0.5, 0.6);
    for (_, p) in vis.ambient().iter() {
        let style = DrawStyle::solid(dust).with_alpha(p.opacity() * 0.3).with_glow(halo(10.0));
        surface.fill_circle(p.pos, p.size, style);
    }

    for (_, b) in vis.bursts().iter() {
        surface.fill_circle(b.pos, b.size, DrawStyle::solid(b.tint).with_alpha(b.opacity()).with_glow(halo(6.0)));
    }

    for (_, t) in vis.trail().iter() {
        let color = palette::hsl(270.0 + (1.0 - t.opacity()) * 60.0, 0.7, 0.6);
        let style = DrawStyle::solid(color).with_alpha(t.opacity()).with_glow(halo(15.0));
        surface.stroke_circle(t.pos, t.size, 3.0, style);
    }

    for link in vis.links() {
        surface.line(link.from, link.to, 1.0, DrawStyle::solid(palette::TRAIL_LINK).with_alpha(link.alpha));
    }
}

/// Paint the mini-game overlay in field coordinates
pub fn draw_game<S: RenderSurface + ?Sized>(surface: &mut S, session: &GameSession, glow: bool) {
    let halo = |radius: f32| if glow { radius } else { 0.0 };
    surface.clear(palette::FIELD);

    for brick in session.bricks.iter().filter(|b| !b.destroyed) {
        surface.fill_rect(brick.rect.min, brick.rect.size, DrawStyle::solid(brick.color).with_glow(halo(10.0)));
    }

    for (_, e) in session.enemies.iter() {
        surface.fill_circle(e.pos, e.size, DrawStyle::solid(e.tint).with_glow(halo(8.0)));
    }
    for (_, b) in session.bullets.iter() {
        surface.fill_circle(b.pos, b.size, DrawStyle::solid(b.tint).with_glow(halo(6.0)));
    }

    if let Some(ball) = session.ball {
        surface.fill_circle(ball.pos, ball.radius, DrawStyle::solid(palette::BALL).with_glow(halo(8.0)));
    }

    // Idle shows an empty field until the first round lays out the entities
    if session.phase != GamePhase::Idle {
        let paddle = session.paddle.rect();
        surface.fill_rect(paddle.min, paddle.size, DrawStyle::solid(palette::PADDLE).with_glow(halo(12.0)));
    }

    for (_, f) in session.fragments.iter() {
        surface.fill_circle(f.pos, f.size, DrawStyle::solid(f.tint).with_alpha(f.opacity()));
    }

    if session.phase.is_terminal() {
        let field = session.field();
        surface.fill_rect(field.min, field.size, DrawStyle::solid([0.0, 0.0, 0.0, 1.0]).with_alpha(0.8));
    }
}
