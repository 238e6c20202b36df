use std::fmt;

use super::{
    camera::{Camera, Viewport},
    core::{Light, Material, Scene, Sphere},
    Color, Mat3, Vec3,
};

/// Recursive-descent parser for the plain-text scene description format:
///
/// ```text
/// size 128 128
/// viewport 1.0 1.0
/// background black
/// camera from (3, 0, 1) to (0, 0, 3)
/// sphere (0, -1, 3) 1 red specular 500 reflective 0.2
/// light ambient 0.2
/// light point 0.6 (2, 1, 0)
/// light directional 0.2 (1, 4, 4)
/// ```
pub struct SceneParser<'a> {
    content: &'a str,
    buffer: String,
    position: FilePosition,
}

#[derive(Debug, Clone, Copy)]
struct FilePosition {
    line: u32,
    column: u32,
    index: u32,
}

impl FilePosition {
    fn new() -> Self {
        FilePosition {
            line: 0,
            column: 0,
            index: 0,
        }
    }

    fn on_new_line(self: &mut Self) {
        self.line += 1;
        self.column = 0;
        self.index += 1;
    }

    fn advance(self: &mut Self) {
        self.column += 1;
        self.index += 1;
    }
}

#[derive(Debug)]
pub struct ParserError {
    position: FilePosition,
    pub message: String,
}

impl ParserError {
    fn new(message: &str, position: FilePosition) -> ParserError {
        ParserError {
            position,
            message: message.to_string(),
        }
    }

    pub fn print_error_location(self: &Self, content: &str) {
        println!("{}", self);
        if let Some(line) = content.lines().nth(self.position.line as usize) {
            println!("{}", line);
            let spacing = " ".repeat(self.position.column as usize);
            println!("{}^", spacing);
        }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.message, self.position.line, self.position.column
        )
    }
}

type ParserResult<T> = Result<T, ParserError>;

/// Everything a scene file describes: the canvas size, the view into the
/// world and the world itself.
#[derive(Debug)]
pub struct SceneDescription {
    pub width: u32,
    pub height: u32,
    pub viewport: Viewport,
    pub camera: Camera,
    pub scene: Scene,
}

impl SceneParser<'_> {
    pub fn new<'a>(content: &'a str) -> SceneParser<'a> {
        SceneParser {
            content,
            position: FilePosition::new(),
            buffer: "".to_string(),
        }
    }

    fn get_current_char(self: &Self) -> Option<char> {
        self.content.chars().nth(self.position.index as usize)
    }

    fn is_empty(self: &Self) -> bool {
        self.get_current_char().is_none()
    }

    fn advance(self: &mut Self) {
        if let Some(current_char) = self.get_current_char() {
            if current_char == '\n' {
                self.position.on_new_line();
            } else {
                self.position.advance();
            }
        }
    }

    fn advance_until(self: &mut Self, f: impl Fn(char) -> bool) {
        while let Some(current_char) = self.get_current_char() {
            if f(current_char) {
                break;
            }
            self.advance();
        }
    }

    fn eat_spaces(self: &mut Self) {
        // consume all the empty lines, spaces and comments before the next token
        while let Some(current_char) = self.get_current_char() {
            // comments
            if current_char == '#' {
                // consume the characters until the end of the line
                // note: we don't consume the end-of-line here but at the end of the loop
                self.advance_until(|c| c == '\n');
            } else if !current_char.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    // push the current char onto the token and return the char after it,
    // or a space once the input runs out
    fn consume_into(self: &mut Self, result: &mut String) -> char {
        if let Some(current_char) = self.get_current_char() {
            result.push(current_char);
            self.advance();
        }
        self.get_current_char().unwrap_or(' ')
    }

    fn pop(self: &mut Self) -> String {
        // check if we already peeked without eating the next token
        if !self.buffer.is_empty() {
            return std::mem::take(&mut self.buffer);
        }

        self.eat_spaces();
        let mut result = String::new();
        let Some(mut current_char) = self.get_current_char() else {
            return result;
        };

        match current_char {
            // single-character symbols
            ',' | '(' | ')' | '>' => {
                self.advance();
                result.push(current_char);
            }
            // float parsing
            '.' | '+' | '-' | '0'..='9' => {
                if current_char == '+' || current_char == '-' {
                    current_char = self.consume_into(&mut result);
                }
                while current_char.is_ascii_digit() {
                    current_char = self.consume_into(&mut result);
                }
                if current_char == '.' {
                    current_char = self.consume_into(&mut result);
                    while current_char.is_ascii_digit() {
                        current_char = self.consume_into(&mut result);
                    }
                }
            }
            _ => {
                while current_char.is_alphabetic() {
                    current_char = self.consume_into(&mut result);
                }
            }
        }
        result
    }

    fn peek(self: &mut Self) -> &str {
        // peek always look ahead and save the result to the buffer
        if self.buffer.is_empty() {
            self.buffer = self.pop();
        }
        &self.buffer
    }

    fn error<T>(self: &mut Self, message: &str) -> ParserResult<T> {
        Err(ParserError::new(message, self.position))
    }

    fn parse_float(self: &mut Self) -> ParserResult<f64> {
        let next_token = self.pop();
        if let Ok(num) = next_token.parse::<f64>() {
            Ok(num)
        } else {
            let message = format!(
                "error parsing file: cannot interp '{}' as a float",
                next_token
            );
            self.error(&message)
        }
    }

    fn match_token(self: &mut Self, expected_lexem: &str) -> ParserResult<()> {
        // match primitive: consume a lexem from the list and if is different
        // from the expected one raise an error
        let next_lexem = self.pop();
        if next_lexem != expected_lexem {
            let message = format!(
                "error parsing the scene file: expected '{}', getting '{}' instead",
                expected_lexem, next_lexem
            );
            self.error(&message)
        } else {
            Ok(())
        }
    }

    fn maybe_match(self: &mut Self, expected_lexem: &str) -> bool {
        // variant of match that can fail
        // if the expected lexem is the next in the stream, we consume it and returns true.
        // return false otherwise leaving the stream untouched
        if self.peek() == expected_lexem {
            self.pop();
            return true;
        }
        false
    }

    fn parse_header(self: &mut Self) -> ParserResult<(f64, f64)> {
        self.match_token("size")?;
        let width = self.parse_float()?;
        let height = self.parse_float()?;
        Ok((width, height))
    }

    fn parse_vec3(self: &mut Self) -> ParserResult<Vec3> {
        self.match_token("(")?;
        let x = self.parse_float()?;
        self.match_token(",")?;
        let y = self.parse_float()?;
        self.match_token(",")?;
        let z = self.parse_float()?;
        self.match_token(")")?;
        Ok(Vec3::new(x, y, z))
    }

    fn parse_color(self: &mut Self) -> ParserResult<Color> {
        // predefined color
        if self.maybe_match("red") {
            Ok(Color::new(255, 0, 0))
        } else if self.maybe_match("green") {
            Ok(Color::new(0, 255, 0))
        } else if self.maybe_match("blue") {
            Ok(Color::new(0, 0, 255))
        } else if self.maybe_match("white") {
            Ok(Color::new(255, 255, 255))
        } else if self.maybe_match("black") {
            Ok(Color::BLACK)
        } else if self.maybe_match("cyan") {
            Ok(Color::new(0, 255, 255))
        } else if self.maybe_match("violet") {
            Ok(Color::new(255, 0, 255))
        } else if self.maybe_match("yellow") {
            Ok(Color::new(255, 255, 0))
        } else if self.maybe_match("orange") {
            Ok(Color::new(250, 115, 5))
        } else {
            let value = self.parse_vec3()?;
            for component in [value.x, value.y, value.z] {
                if !(0.0..=255.0).contains(&component) {
                    return self.error("color components must be in the range 0-255");
                }
            }
            Ok(Color::new(value.x as u8, value.y as u8, value.z as u8))
        }
    }

    fn parse_material(self: &mut Self) -> ParserResult<Material> {
        let color = self.parse_color()?;
        // without further clauses the surface stays matte and non-reflective
        let mut material = Material::matte(color);
        loop {
            if self.maybe_match("specular") {
                material.specular = self.parse_float()?;
            } else if self.maybe_match("reflective") {
                let reflective = self.parse_float()?;
                if !(0.0..=1.0).contains(&reflective) {
                    return self.error("reflective must be in the range 0-1");
                }
                material.reflective = reflective;
            } else {
                break;
            }
        }
        Ok(material)
    }

    fn parse_sphere(self: &mut Self) -> ParserResult<Sphere> {
        self.match_token("sphere")?;
        let center = self.parse_vec3()?;
        let radius = self.parse_float()?;
        let material = self.parse_material()?;
        Ok(Sphere {
            center,
            radius,
            material,
        })
    }

    fn parse_light(self: &mut Self) -> ParserResult<Light> {
        self.match_token("light")?;
        if self.maybe_match("ambient") {
            let intensity = self.parse_float()?;
            Ok(Light::Ambient { intensity })
        } else if self.maybe_match("point") {
            let intensity = self.parse_float()?;
            let position = self.parse_vec3()?;
            Ok(Light::Point {
                intensity,
                position,
            })
        } else if self.maybe_match("directional") {
            let intensity = self.parse_float()?;
            let direction = self.parse_vec3()?;
            Ok(Light::Directional {
                intensity,
                direction,
            })
        } else {
            self.error("expected 'ambient', 'point' or 'directional' after 'light'")
        }
    }

    fn parse_camera(self: &mut Self) -> ParserResult<Camera> {
        self.match_token("camera")?;
        let mut position = Vec3::zero();
        if self.maybe_match("from") {
            position = self.parse_vec3()?;
        }
        if self.maybe_match("to") {
            let target = self.parse_vec3()?;
            return Ok(Camera::look_at(position, target));
        }
        let rotation = self.parse_rotation()?;
        Ok(Camera::new(position, rotation))
    }

    fn parse_rotation(self: &mut Self) -> ParserResult<Mat3> {
        // chain of "> rotate (axis) angle" steps, composed in file order;
        // angles are in radians
        let mut rotation = Mat3::identity();
        while self.maybe_match(">") {
            self.match_token("rotate")?;
            let axis = self.parse_vec3()?;
            let angle = self.parse_float()?;
            rotation = rotation.then(&Mat3::rotate(axis, angle));
        }
        Ok(rotation)
    }

    fn parse_viewport(self: &mut Self) -> ParserResult<Viewport> {
        self.match_token("viewport")?;
        let width = self.parse_float()?;
        let height = self.parse_float()?;
        Ok(Viewport::new(width, height))
    }

    pub fn parse_scene(self: &mut Self) -> ParserResult<SceneDescription> {
        // main routine that parse the whole file
        let (width, height) = self.parse_header()?;

        let mut viewport = Viewport::default();
        let mut camera = Camera::default();
        let mut background_color = Color::BLACK;
        let mut objects = Vec::new();
        let mut lights = Vec::new();

        loop {
            let next_token = self.peek().to_string();
            match next_token.as_str() {
                "" => {
                    if self.is_empty() {
                        break;
                    }
                    return self.error("unexpected character in scene file");
                }
                "viewport" => viewport = self.parse_viewport()?,
                "background" => {
                    self.match_token("background")?;
                    background_color = self.parse_color()?;
                }
                "camera" => camera = self.parse_camera()?,
                "sphere" => {
                    let object = self.parse_sphere()?;
                    objects.push(object);
                }
                "light" => {
                    let light = self.parse_light()?;
                    lights.push(light);
                }
                _ => {
                    let message = format!("unexpected token '{}'", next_token);
                    return self.error(&message);
                }
            }
        }

        Ok(SceneDescription {
            width: width as u32,
            height: height as u32,
            viewport,
            camera,
            scene: Scene {
                objects,
                lights,
                background_color,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# three spheres resting on a big yellow one
size 128 128
viewport 1.0 1.0
background black
camera from (3, 0, 1) to (0, 0, 3)

sphere (0, -1, 3) 1 red specular 500 reflective 0.2
sphere (-2, 0, 4) 1 green specular 10 reflective 0.4
sphere (2, 0, 4) 1 blue specular 500 reflective 0.3
sphere (0, -5001, 0) 5000 yellow specular 1000 reflective 0.5

light ambient 0.2
light point 0.6 (2, 1, 0)
light directional 0.2 (1, 4, 4)
"#;

    #[test]
    fn test_parses_the_sample_scene() {
        let mut parser = SceneParser::new(SAMPLE);
        let description = parser.parse_scene().expect("sample scene must parse");

        assert_eq!(description.width, 128);
        assert_eq!(description.height, 128);
        assert_eq!(description.scene.objects.len(), 4);
        assert_eq!(description.scene.lights.len(), 3);
        assert_eq!(description.scene.background_color, Color::BLACK);
        assert_eq!(description.camera.origin, Vec3::new(3.0, 0.0, 1.0));

        let floor = &description.scene.objects[3];
        assert_eq!(floor.center, Vec3::new(0.0, -5001.0, 0.0));
        assert_eq!(floor.radius, 5000.0);
        assert_eq!(floor.material.color, Color::new(255, 255, 0));
        assert_eq!(floor.material.specular, 1000.0);
        assert_eq!(floor.material.reflective, 0.5);

        match description.scene.lights[1] {
            Light::Point {
                intensity,
                position,
            } => {
                assert_eq!(intensity, 0.6);
                assert_eq!(position, Vec3::new(2.0, 1.0, 0.0));
            }
            _ => panic!("second light must be the point light"),
        }
    }

    #[test]
    fn test_material_defaults_to_matte() {
        let mut parser = SceneParser::new("size 8 8\nsphere (0, 0, 3) 1 (10, 20, 30)");
        let description = parser.parse_scene().unwrap();

        let material = description.scene.objects[0].material;
        assert_eq!(material.color, Color::new(10, 20, 30));
        assert_eq!(material.specular, Material::MATTE);
        assert_eq!(material.reflective, 0.0);
    }

    #[test]
    fn test_missing_size_header_is_an_error() {
        let mut parser = SceneParser::new("sphere (0, 0, 3) 1 red");
        assert!(parser.parse_scene().is_err());
    }

    #[test]
    fn test_unexpected_token_reports_its_position() {
        let mut parser = SceneParser::new("size 8 8\ntriangle (0, 0, 3) 1 red");
        let error = parser.parse_scene().unwrap_err();
        assert!(error.message.contains("triangle"));
        assert!(format!("{}", error).contains(" at 1:"));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let mut parser = SceneParser::new("size 8 8\nsphere (0, 0, 3) 1 red reflective 1.5");
        assert!(parser.parse_scene().is_err());

        let mut parser = SceneParser::new("size 8 8\nbackground (300, 0, 0)");
        assert!(parser.parse_scene().is_err());
    }

    #[test]
    fn test_camera_rotation_chain() {
        let mut parser =
            SceneParser::new("size 8 8\ncamera from (0, 0, 0) > rotate (0, 1, 0) 1.5707963");
        let description = parser.parse_scene().unwrap();

        let forward = description.camera.rotation.apply(Vec3::z_axis());
        assert!(forward.distance(Vec3::x_axis()) < 1e-6);
    }

    #[test]
    fn test_defaults_when_only_geometry_is_given() {
        let mut parser = SceneParser::new("size 16 16\nsphere (0, 0, 3) 1 white");
        let description = parser.parse_scene().unwrap();

        assert_eq!(description.viewport.width, 1.0);
        assert_eq!(description.viewport.height, 1.0);
        assert_eq!(description.camera.origin, Vec3::zero());
        assert_eq!(description.scene.background_color, Color::BLACK);
    }
}
