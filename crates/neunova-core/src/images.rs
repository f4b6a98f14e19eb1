//! Images to PDF
//!
//! One page per image, page size equal to the image size in points. JPEGs
//! with gray or RGB data are embedded as-is (`DCTDecode`); everything else is
//! decoded with `image` and stored as Flate-compressed RGB.

use std::io::{Cursor, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::codecs::jpeg::JpegDecoder;
use image::{ColorType, ImageDecoder};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::{debug, warn};

use crate::error::PdfError;

/// US Letter, used for placeholder pages.
const PLACEHOLDER_SIZE: (i64, i64) = (612, 792);

/// An uploaded image and the name it was uploaded under.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Pixel data ready to become an image XObject.
struct EmbeddedImage {
    width: u32,
    height: u32,
    color_space: &'static str,
    filter: &'static str,
    data: Vec<u8>,
}

/// Build a PDF with one page per image.
///
/// An image that cannot be decoded does not fail the document: its page is
/// replaced by a Letter-sized page saying so.
pub fn images_to_pdf(images: &[ImageInput]) -> Result<Vec<u8>, PdfError> {
    if images.is_empty() {
        return Err(PdfError::OperationError("No images to convert".into()));
    }

    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Helvetica".to_vec())),
    ]));

    let mut kids = Vec::with_capacity(images.len());
    for image in images {
        let page_id = match embed(&image.bytes) {
            Ok(embedded) => {
                debug!(
                    name = %image.name,
                    width = embedded.width,
                    height = embedded.height,
                    filter = embedded.filter,
                    "adding image page"
                );
                image_page(&mut doc, pages_id, embedded)?
            }
            Err(reason) => {
                warn!(name = %image.name, %reason, "image could not be decoded, adding placeholder page");
                placeholder_page(&mut doc, pages_id, font_id, &image.name)?
            }
        };
        kids.push(Object::Reference(page_id));
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(kids.len() as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| PdfError::OperationError(format!("Save failed: {}", e)))?;
    Ok(buffer)
}

fn embed(bytes: &[u8]) -> Result<EmbeddedImage, String> {
    if let Some(jpeg) = passthrough_jpeg(bytes) {
        return Ok(jpeg);
    }

    let decoded = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(rgb.as_raw())
        .and_then(|_| encoder.finish())
        .map(|data| EmbeddedImage {
            width,
            height,
            color_space: "DeviceRGB",
            filter: "FlateDecode",
            data,
        })
        .map_err(|e| e.to_string())
}

/// 8-bit JPEGs with 1 or 3 components can go into the PDF untouched.
/// 12-bit, CMYK and anything the decoder rejects falls back to decoding.
fn passthrough_jpeg(bytes: &[u8]) -> Option<EmbeddedImage> {
    // The SOF header carries what the decoder hides: sample precision and
    // the raw component count (CMYK is reported as RGB after conversion).
    let frame = jpeg_frame(bytes)?;
    if frame.precision != 8 {
        return None;
    }

    let decoder = JpegDecoder::new(Cursor::new(bytes)).ok()?;
    let (width, height) = decoder.dimensions();
    let color_space = match (decoder.color_type(), frame.components) {
        (ColorType::L8, 1) => "DeviceGray",
        (ColorType::Rgb8, 3) => "DeviceRGB",
        _ => return None,
    };
    if width == 0 || height == 0 {
        return None;
    }
    Some(EmbeddedImage {
        width,
        height,
        color_space,
        filter: "DCTDecode",
        data: bytes.to_vec(),
    })
}

struct JpegFrame {
    precision: u8,
    width: u16,
    height: u16,
    components: u8,
}

/// Walk JPEG markers up to the first start-of-frame segment.
fn jpeg_frame(bytes: &[u8]) -> Option<JpegFrame> {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        // Fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        let length = usize::from(u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]));
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            let segment = bytes.get(pos + 4..pos + 2 + length)?;
            if segment.len() < 6 {
                return None;
            }
            return Some(JpegFrame {
                precision: segment[0],
                height: u16::from_be_bytes([segment[1], segment[2]]),
                width: u16::from_be_bytes([segment[3], segment[4]]),
                components: segment[5],
            });
        }
        pos += 2 + length;
    }
    None
}

fn image_page(
    doc: &mut Document,
    pages_id: ObjectId,
    image: EmbeddedImage,
) -> Result<ObjectId, PdfError> {
    let (width, height) = (i64::from(image.width), i64::from(image.height));

    let xobject = Stream::new(
        Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(width)),
            ("Height", Object::Integer(height)),
            ("ColorSpace", Object::Name(image.color_space.as_bytes().to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(image.filter.as_bytes().to_vec())),
        ]),
        image.data,
    );
    let image_id = doc.add_object(xobject);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Integer(width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(height),
                    Object::Integer(0),
                    Object::Integer(0),
                ],
            ),
            Operation::new("Do", vec![Object::Name(b"Im0".to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let resources = Dictionary::from_iter(vec![(
        "XObject",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "Im0",
            Object::Reference(image_id),
        )])),
    )]);

    add_page(doc, pages_id, (width, height), resources, content)
}

fn placeholder_page(
    doc: &mut Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    name: &str,
) -> Result<ObjectId, PdfError> {
    // Helvetica here has no encoding beyond Latin-1, keep the label printable.
    let label: String = format!("Unable to render image: {}", name)
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
        .collect();

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![Object::Name(b"F1".to_vec()), Object::Integer(12)]),
            Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
            Operation::new(
                "Tj",
                vec![Object::String(label.into_bytes(), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ],
    };
    let resources = Dictionary::from_iter(vec![(
        "Font",
        Object::Dictionary(Dictionary::from_iter(vec![(
            "F1",
            Object::Reference(font_id),
        )])),
    )]);

    add_page(doc, pages_id, PLACEHOLDER_SIZE, resources, content)
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    (width, height): (i64, i64),
    resources: Dictionary,
    content: Content,
) -> Result<ObjectId, PdfError> {
    let encoded = content
        .encode()
        .map_err(|e| PdfError::OperationError(format!("Content encoding failed: {}", e)))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), encoded));

    let page = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Page".to_vec())),
        ("Parent", Object::Reference(pages_id)),
        (
            "MediaBox",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ]),
        ),
        ("Resources", Object::Dictionary(resources)),
        ("Contents", Object::Reference(content_id)),
    ]);
    Ok(doc.add_object(page))
}
