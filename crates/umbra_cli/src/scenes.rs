//! Built-in demo scenes.
//!
//! Each scene supplies its world (already wrapped in a BVH where it pays
//! off), a camera and the bounce limit it was tuned for.

use std::f32::consts::FRAC_PI_4;
use std::sync::Arc;

use anyhow::{bail, Result};
use rand::RngCore;
use umbra_renderer::random::{gen_f32, gen_range, random_vec3};
use umbra_renderer::{
    make_box, BvhNode, Camera, CheckerTexture, Color, ConstantMedium, Dielectric, DiffuseLight,
    HittableList, ImageTexture, Lambertian, Metal, NoiseTexture, Planar, RotateY, Sphere,
    Translate, Vec3, World,
};

/// Sky colour of the outdoor scenes.
const SKY: Color = Color::new(0.7, 0.8, 1.0);

/// Texture used by the earth scenes, relative to the working directory.
const EARTH_MAP: &str = "map.jpg";

/// Scene names, indexed by scene number - 1.
pub const SCENE_NAMES: [&str; 12] = [
    "bouncing spheres",
    "checkered spheres",
    "earth",
    "perlin spheres",
    "quads",
    "triangles",
    "ellipses",
    "simple light",
    "cornell box",
    "cornell smoke",
    "final scene",
    "field of view",
];

pub struct Scene {
    pub world: World,
    pub camera: Camera,
    pub max_depth: u32,
}

/// Build scene `number` (1-based) for the given output size.
pub fn build(number: u32, width: u32, aspect_ratio: f32, rng: &mut dyn RngCore) -> Result<Scene> {
    let (world, camera, max_depth) = match number {
        1 => bouncing_spheres(rng),
        2 => checkered_spheres(),
        3 => earth(),
        4 => perlin_spheres(rng),
        5 => quads(),
        6 => triangles(),
        7 => ellipses(),
        8 => simple_light(rng),
        9 => cornell_box(),
        10 => cornell_smoke(),
        11 => final_scene(rng),
        12 => field_of_view(),
        _ => bail!("no scene {} (expected 1..={})", number, SCENE_NAMES.len()),
    };

    Ok(Scene {
        world,
        camera: camera.with_image(width, aspect_ratio),
        max_depth,
    })
}

fn outdoor_camera(look_from: Vec3, look_at: Vec3, vfov: f32) -> Camera {
    Camera::new()
        .with_position(look_from, look_at, Vec3::Y)
        .with_vfov(vfov)
}

fn bouncing_spheres(rng: &mut dyn RngCore) -> (World, Camera, u32) {
    let mut world = HittableList::new();

    world.add(Sphere::new(
        Vec3::new(0.0, -1000.0, 0.0),
        1000.0,
        Lambertian::new(Color::splat(0.5)),
    ));

    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f32(rng);
            let center = Vec3::new(
                a as f32 + 0.9 * gen_f32(rng),
                0.2,
                b as f32 + 0.9 * gen_f32(rng),
            );

            if (center - Vec3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.8 {
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                let center2 = center + Vec3::new(0.0, gen_range(rng, 0.0, 0.5), 0.0);
                world.add(Sphere::moving(center, center2, 0.2, Lambertian::new(albedo)));
            } else if choose_mat < 0.95 {
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = gen_range(rng, 0.0, 0.5);
                world.add(Sphere::new(center, 0.2, Metal::new(albedo, fuzz)));
            } else {
                world.add(Sphere::new(center, 0.2, Dielectric::new(1.5)));
            }
        }
    }

    world.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Dielectric::new(1.5)));
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Lambertian::new(Color::new(0.4, 0.2, 0.1)),
    ));
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Metal::new(Color::new(0.7, 0.6, 0.5), 0.0),
    ));

    let camera = Camera::new()
        .with_position(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, Vec3::Y)
        .with_lens(20.0, 0.6, 10.0);

    (World::with_background(BvhNode::from_list(world), SKY), camera, 50)
}

fn checkered_spheres() -> (World, Camera, u32) {
    let checker = Lambertian::from_texture(Arc::new(CheckerTexture::from_colors(
        0.32,
        Color::new(0.2, 0.3, 0.1),
        Color::splat(0.9),
    )));

    let mut world = HittableList::new();
    world.add(Sphere::new(Vec3::new(0.0, -10.0, 0.0), 10.0, checker.clone()));
    world.add(Sphere::new(Vec3::new(0.0, 10.0, 0.0), 10.0, checker));

    let camera = outdoor_camera(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, 20.0);
    (World::with_background(world, SKY), camera, 50)
}

fn earth() -> (World, Camera, u32) {
    let surface = Lambertian::from_texture(Arc::new(ImageTexture::load(EARTH_MAP)));
    let globe = Sphere::new(Vec3::ZERO, 2.0, surface);

    let camera = outdoor_camera(Vec3::new(0.0, 0.0, 12.0), Vec3::ZERO, 20.0);
    (World::with_background(globe, SKY), camera, 50)
}

fn perlin_spheres(rng: &mut dyn RngCore) -> (World, Camera, u32) {
    let marble = Lambertian::from_texture(Arc::new(NoiseTexture::new(4.0, rng)));

    let mut world = HittableList::new();
    world.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone()));
    world.add(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble));

    let camera = outdoor_camera(Vec3::new(13.0, 2.0, 3.0), Vec3::ZERO, 20.0);
    (World::with_background(world, SKY), camera, 50)
}

fn quads() -> (World, Camera, u32) {
    let left_red = Lambertian::new(Color::new(1.0, 0.2, 0.2));
    let back_green = Lambertian::new(Color::new(0.2, 1.0, 0.2));
    let right_blue = Lambertian::new(Color::new(0.2, 0.2, 1.0));
    let upper_orange = Lambertian::new(Color::new(1.0, 0.5, 0.0));
    let lower_teal = Lambertian::new(Color::new(0.2, 0.8, 0.8));

    let mut world = HittableList::new();
    world.add(Planar::quad(
        Vec3::new(-3.0, -2.0, 5.0),
        Vec3::new(0.0, 0.0, -4.0),
        Vec3::new(0.0, 4.0, 0.0),
        left_red,
    ));
    world.add(Planar::quad(
        Vec3::new(-2.0, -2.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 4.0, 0.0),
        right_blue,
    ));
    world.add(Planar::quad(
        Vec3::new(3.0, -2.0, 1.0),
        Vec3::new(0.0, 0.0, 4.0),
        Vec3::new(0.0, 4.0, 0.0),
        back_green,
    ));
    world.add(Planar::quad(
        Vec3::new(-2.0, 3.0, 1.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 4.0),
        upper_orange,
    ));
    world.add(Planar::quad(
        Vec3::new(-2.0, -3.0, 1.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 4.0),
        lower_teal,
    ));

    let camera = outdoor_camera(Vec3::new(0.0, 0.0, 9.0), Vec3::ZERO, 80.0);
    (World::with_background(world, SKY), camera, 50)
}

fn triangles() -> (World, Camera, u32) {
    let mut world = HittableList::new();
    world.add(Planar::triangle(
        Vec3::new(-3.0, -2.0, 5.0),
        Vec3::new(0.0, 0.0, -4.0),
        Vec3::new(0.0, 4.0, 0.0),
        Lambertian::new(Color::new(1.0, 0.2, 0.2)),
    ));
    world.add(Planar::triangle(
        Vec3::new(-2.0, -2.0, 0.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 4.0, 0.0),
        Lambertian::new(Color::new(0.2, 0.2, 1.0)),
    ));
    world.add(Planar::triangle(
        Vec3::new(3.0, -2.0, 1.0),
        Vec3::new(0.0, 0.0, 4.0),
        Vec3::new(0.0, 4.0, 0.0),
        Lambertian::new(Color::new(0.2, 1.0, 0.2)),
    ));

    let camera = outdoor_camera(Vec3::new(0.0, 0.0, 9.0), Vec3::ZERO, 80.0);
    (World::with_background(world, SKY), camera, 50)
}

fn ellipses() -> (World, Camera, u32) {
    let yellow = Lambertian::new(Color::new(0.8, 0.8, 0.0));

    let mut world = HittableList::new();
    world.add(Planar::ellipse(Vec3::ZERO, Vec3::X, Vec3::Y, yellow.clone()));
    world.add(Planar::ellipse(
        Vec3::new(2.5, 0.0, 0.0),
        Vec3::X,
        Vec3::new(0.0, 2.0, -1.0),
        yellow.clone(),
    ));
    world.add(Planar::disc(
        Vec3::new(-2.5, 0.0, 0.0),
        Vec3::new(1.0, 1.0, 0.0),
        Vec3::Y,
        1.5,
        yellow,
    ));

    let camera = outdoor_camera(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 80.0);
    (World::with_background(world, SKY), camera, 50)
}

fn simple_light(rng: &mut dyn RngCore) -> (World, Camera, u32) {
    let marble = Lambertian::from_texture(Arc::new(NoiseTexture::new(4.0, rng)));
    let light = DiffuseLight::new(Color::splat(4.0));

    let mut world = HittableList::new();
    world.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, marble.clone()));
    world.add(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 2.0, marble));
    world.add(Planar::quad(
        Vec3::new(3.0, 1.0, -2.0),
        Vec3::new(2.0, 0.0, 0.0),
        Vec3::new(0.0, 2.0, 0.0),
        light.clone(),
    ));
    world.add(Sphere::new(Vec3::new(0.0, 7.0, 0.0), 2.0, light));

    let camera = outdoor_camera(Vec3::new(26.0, 3.0, 6.0), Vec3::new(0.0, 2.0, 0.0), 20.0);
    (World::with_background(world, Color::ZERO), camera, 50)
}

/// The five walls of the Cornell box, open towards the camera.
fn cornell_walls(world: &mut HittableList, green: Color) {
    let red = Lambertian::new(Color::new(0.65, 0.05, 0.05));
    let white = Lambertian::new(Color::splat(0.73));
    let green = Lambertian::new(green);

    world.add(Planar::quad(
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        green,
    ));
    world.add(Planar::quad(
        Vec3::ZERO,
        Vec3::new(0.0, 555.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        red,
    ));
    world.add(Planar::quad(
        Vec3::ZERO,
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 555.0),
        white.clone(),
    ));
    world.add(Planar::quad(
        Vec3::splat(555.0),
        Vec3::new(-555.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -555.0),
        white.clone(),
    ));
    world.add(Planar::quad(
        Vec3::new(0.0, 0.0, 555.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        white,
    ));
}

/// The tall and the short block, rotated and placed inside the box.
fn cornell_blocks() -> (Translate, Translate) {
    let white = Lambertian::new(Color::splat(0.73));

    let tall = make_box(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), white.clone());
    let tall = Translate::new(RotateY::new(tall, 15.0), Vec3::new(265.0, 0.0, 295.0));

    let short = make_box(Vec3::ZERO, Vec3::splat(165.0), white);
    let short = Translate::new(RotateY::new(short, -18.0), Vec3::new(130.0, 0.0, 65.0));

    (tall, short)
}

fn cornell_camera() -> Camera {
    Camera::new()
        .with_position(Vec3::new(278.0, 278.0, -800.0), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_vfov(40.0)
}

fn cornell_box() -> (World, Camera, u32) {
    let light = DiffuseLight::new(Color::splat(25.0));

    let mut world = HittableList::new();
    cornell_walls(&mut world, Color::new(0.12, 0.45, 0.09));
    world.add(Planar::quad(
        Vec3::new(343.0, 554.0, 332.0),
        Vec3::new(-130.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -105.0),
        light.clone(),
    ));

    let (tall, short) = cornell_blocks();
    world.add(tall);
    world.add(short);

    // Fill light behind the camera
    world.add(Planar::quad(
        Vec3::new(0.0, 0.0, -1000.0),
        Vec3::new(555.0, 0.0, 0.0),
        Vec3::new(0.0, 555.0, 0.0),
        light,
    ));

    (World::new(world), cornell_camera(), 20)
}

fn cornell_smoke() -> (World, Camera, u32) {
    let mut world = HittableList::new();
    cornell_walls(&mut world, Color::new(0.12, 0.45, 0.15));
    world.add(Planar::quad(
        Vec3::new(113.0, 554.0, 127.0),
        Vec3::new(330.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 305.0),
        DiffuseLight::new(Color::splat(7.0)),
    ));

    let (tall, short) = cornell_blocks();
    world.add(ConstantMedium::from_color(tall, 0.01, Color::ZERO));
    world.add(ConstantMedium::from_color(short, 0.01, Color::ONE));

    (World::new(world), cornell_camera(), 50)
}

fn final_scene(rng: &mut dyn RngCore) -> (World, Camera, u32) {
    let ground = Lambertian::new(Color::new(0.48, 0.83, 0.53));
    let boxes_per_side = 20;
    let mut boxes = HittableList::new();
    for i in 0..boxes_per_side {
        for j in 0..boxes_per_side {
            let w = 100.0;
            let x0 = -1000.0 + i as f32 * w;
            let z0 = -1000.0 + j as f32 * w;
            let y1 = gen_range(rng, 1.0, 101.0);
            boxes.add(make_box(
                Vec3::new(x0, 0.0, z0),
                Vec3::new(x0 + w, y1, z0 + w),
                ground.clone(),
            ));
        }
    }

    let mut world = HittableList::new();
    world.add(BvhNode::from_list(boxes));

    world.add(Planar::quad(
        Vec3::new(123.0, 554.0, 147.0),
        Vec3::new(300.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 265.0),
        DiffuseLight::new(Color::splat(7.0)),
    ));

    let center1 = Vec3::new(400.0, 400.0, 200.0);
    world.add(Sphere::moving(
        center1,
        center1 + Vec3::new(30.0, 0.0, 0.0),
        50.0,
        Lambertian::new(Color::new(0.7, 0.3, 0.1)),
    ));

    let glass = Dielectric::new(1.5);
    world.add(Sphere::new(Vec3::new(260.0, 150.0, 45.0), 50.0, glass));
    world.add(Sphere::new(
        Vec3::new(0.0, 150.0, 145.0),
        50.0,
        Metal::new(Color::new(0.8, 0.8, 0.9), 1.0),
    ));

    // Glass shell with blue haze inside
    let shell_center = Vec3::new(360.0, 150.0, 145.0);
    world.add(Sphere::new(shell_center, 70.0, glass));
    world.add(ConstantMedium::from_color(
        Sphere::new(shell_center, 70.0, glass),
        0.2,
        Color::new(0.2, 0.4, 0.9),
    ));

    // Thin mist over everything
    world.add(ConstantMedium::from_color(
        Sphere::new(Vec3::ZERO, 5000.0, glass),
        0.0001,
        Color::ONE,
    ));

    world.add(Sphere::new(
        Vec3::new(400.0, 200.0, 400.0),
        100.0,
        Lambertian::from_texture(Arc::new(ImageTexture::load(EARTH_MAP))),
    ));
    world.add(Sphere::new(
        Vec3::new(220.0, 280.0, 300.0),
        80.0,
        Lambertian::from_texture(Arc::new(NoiseTexture::new(0.2, rng))),
    ));

    let white = Lambertian::new(Color::splat(0.73));
    let mut cluster = HittableList::new();
    for _ in 0..1000 {
        cluster.add(Sphere::new(random_vec3(rng, 0.0, 165.0), 10.0, white.clone()));
    }
    world.add(Translate::new(
        RotateY::new(BvhNode::from_list(cluster), 15.0),
        Vec3::new(-100.0, 270.0, 395.0),
    ));

    let camera = Camera::new()
        .with_position(Vec3::new(478.0, 278.0, -600.0), Vec3::new(278.0, 278.0, 0.0), Vec3::Y)
        .with_vfov(40.0);

    (World::new(world), camera, 50)
}

/// Two touching spheres filling a wide field of view.
fn field_of_view() -> (World, Camera, u32) {
    let r = FRAC_PI_4.cos();

    let mut world = HittableList::new();
    world.add(Sphere::new(
        Vec3::new(-r, 0.0, -1.0),
        r,
        Lambertian::new(Color::new(0.0, 0.0, 1.0)),
    ));
    world.add(Sphere::new(
        Vec3::new(r, 0.0, -1.0),
        r,
        Lambertian::new(Color::new(1.0, 0.0, 0.0)),
    ));

    let camera = outdoor_camera(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 100.0);
    (World::with_background(world, SKY), camera, 50)
}
