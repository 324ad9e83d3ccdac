use anyhow::{Context, Result};
use image::RgbImage;
use log::warn;
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::collect::global_variables::{ACQUISITION_LABEL, SENTINEL2_URL, TILE_SIZE, TILE_ZOOM};
use crate::error::TileError;

/// Anything that can hand out square RGB tiles addressed by column/row
pub trait TileSource {
    /// Fetch tile (col, row); a missing tile comes back as an all-zero image
    fn fetch_tile(&self, col: i64, row: i64) -> std::result::Result<RgbImage, TileError>;

    /// Edge length of a tile in pixels
    fn tile_size(&self) -> u32 {
        TILE_SIZE
    }
}

/// How a tile response status is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileStatus {
    Ok,
    /// 404 or 500: substitute a blank tile
    Missing,
    /// Anything else: abort the run
    Fatal,
}

pub fn classify_status(status: StatusCode) -> TileStatus {
    if status.is_success() {
        TileStatus::Ok
    } else if status == StatusCode::NOT_FOUND || status == StatusCode::INTERNAL_SERVER_ERROR {
        TileStatus::Missing
    } else {
        TileStatus::Fatal
    }
}

/// Blank tile used in place of missing imagery
pub fn blank_tile(tile_size: u32) -> RgbImage {
    RgbImage::new(tile_size, tile_size)
}

/// Sentinel-2 TCI mosaic tiles served over HTTP
/// Tiles are addressed by acquisition label, zoom, column and row
pub struct SentinelTileCollect {
    client: Client,
    url_template: String,
    label: String,
    zoom: u32,
    tile_size: u32,
}

impl SentinelTileCollect {
    /// Create a collector for the given acquisition label (e.g. "2024-01")
    pub fn new(label: &str) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(SentinelTileCollect {
            client,
            url_template: SENTINEL2_URL.to_string(),
            label: label.to_string(),
            zoom: TILE_ZOOM,
            tile_size: TILE_SIZE,
        })
    }

    /// Collector for the default mosaic
    pub fn default_mosaic() -> Result<Self> {
        Self::new(ACQUISITION_LABEL)
    }

    /// Override the URL template (placeholders: [LABEL], [ZOOM], [COL], [ROW])
    pub fn with_url_template(mut self, template: &str) -> Self {
        self.url_template = template.to_string();
        self
    }

    pub fn with_zoom(mut self, zoom: u32) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Build the tile URL for (col, row)
    pub fn tile_url(&self, col: i64, row: i64) -> String {
        self.url_template
            .replace("[LABEL]", &self.label)
            .replace("[ZOOM]", &self.zoom.to_string())
            .replace("[COL]", &col.to_string())
            .replace("[ROW]", &row.to_string())
    }
}

impl TileSource for SentinelTileCollect {
    fn fetch_tile(&self, col: i64, row: i64) -> std::result::Result<RgbImage, TileError> {
        let url = self.tile_url(col, row);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|source| TileError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        match classify_status(status) {
            TileStatus::Ok => {}
            TileStatus::Missing => {
                warn!("got status_code={} url={}", status.as_u16(), url);
                return Ok(blank_tile(self.tile_size));
            }
            TileStatus::Fatal => {
                warn!("got status_code={} url={}", status.as_u16(), url);
                return Err(TileError::BadStatus {
                    status: status.as_u16(),
                    url,
                });
            }
        }

        let bytes = response.bytes().map_err(|source| TileError::Request {
            url: url.clone(),
            source,
        })?;

        let tile = image::load_from_memory(&bytes)
            .map_err(|source| TileError::Decode { url, source })?
            .to_rgb8();

        Ok(tile)
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use std::io::{BufRead, BufReader, Cursor, Write};
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_tile_url() {
        let collect = SentinelTileCollect::new("2024-01").unwrap();
        assert_eq!(
            collect.tile_url(1365, 2561),
            "https://se-tile-api.allen.ai/image_mosaic/sentinel2/2024-01/tci/13/1365/2561.png"
        );
    }

    #[test]
    fn test_tile_url_custom_template() {
        let collect = SentinelTileCollect::new("2023-06")
            .unwrap()
            .with_url_template("http://localhost/[LABEL]/[ZOOM]/[COL]/[ROW]")
            .with_zoom(12);
        assert_eq!(collect.tile_url(1, 2), "http://localhost/2023-06/12/1/2");
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(StatusCode::OK), TileStatus::Ok);
        assert_eq!(classify_status(StatusCode::NOT_FOUND), TileStatus::Missing);
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR),
            TileStatus::Missing
        );
        assert_eq!(classify_status(StatusCode::FORBIDDEN), TileStatus::Fatal);
        assert_eq!(classify_status(StatusCode::BAD_GATEWAY), TileStatus::Fatal);
    }

    /// Serve tiles from a local listener; the status code is the tile column,
    /// except column 0 (a real PNG) and column 1 (bytes that are not an image)
    fn serve_tiles() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let mut png = Vec::new();
        let tile = RgbImage::from_fn(8, 8, |x, y| Rgb([x as u8, y as u8, 7]));
        tile.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let Ok(read_half) = stream.try_clone() else {
                    continue;
                };
                let mut reader = BufReader::new(read_half);

                let mut request_line = String::new();
                if reader.read_line(&mut request_line).is_err() {
                    continue;
                }
                loop {
                    let mut header = String::new();
                    if reader.read_line(&mut header).unwrap_or(0) == 0 || header == "\r\n" {
                        break;
                    }
                }

                // GET /<label>/<zoom>/<col>/<row>.png HTTP/1.1
                let path = request_line.split_whitespace().nth(1).unwrap_or("");
                let col: u16 = path.split('/').nth(3).unwrap_or("0").parse().unwrap_or(0);
                let (code, body) = match col {
                    0 => (200, png.clone()),
                    1 => (200, b"not an image".to_vec()),
                    code => (code, b"no tile".to_vec()),
                };

                let mut response = format!(
                    "HTTP/1.1 {} Status\r\nContent-Type: image/png\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n",
                    code,
                    body.len()
                )
                .into_bytes();
                response.extend_from_slice(&body);
                // The client may hang up early on statuses it does not read
                let _ = stream.write_all(&response);
            }
        });

        port
    }

    fn local_collect(port: u16) -> SentinelTileCollect {
        SentinelTileCollect {
            client: Client::builder().no_proxy().build().unwrap(),
            url_template: format!("http://127.0.0.1:{port}/[LABEL]/[ZOOM]/[COL]/[ROW].png"),
            label: "2024-01".to_string(),
            zoom: TILE_ZOOM,
            tile_size: TILE_SIZE,
        }
    }

    #[test]
    fn test_fetch_tile_over_http() {
        let collect = local_collect(serve_tiles());

        let tile = collect.fetch_tile(0, 5).unwrap();
        assert_eq!(tile.dimensions(), (8, 8));
        assert_eq!(tile.get_pixel(3, 6).0, [3, 6, 7]);

        for missing in [404, 500] {
            let tile = collect.fetch_tile(missing, 5).unwrap();
            assert_eq!(tile.dimensions(), (TILE_SIZE, TILE_SIZE));
            assert!(tile.pixels().all(|p| p.0 == [0, 0, 0]));
        }

        for fatal in [403, 502] {
            match collect.fetch_tile(fatal, 5) {
                Err(TileError::BadStatus { status, url }) => {
                    assert_eq!(status as i64, fatal);
                    assert!(url.ends_with(&format!("/2024-01/13/{}/5.png", fatal)));
                }
                other => panic!(
                    "expected BadStatus for {}, got {:?}",
                    fatal,
                    other.map(|t| t.dimensions())
                ),
            }
        }

        assert!(matches!(
            collect.fetch_tile(1, 5),
            Err(TileError::Decode { .. })
        ));
    }

    #[test]
    fn test_blank_tile_is_zero() {
        let tile = blank_tile(8);
        assert_eq!(tile.dimensions(), (8, 8));
        assert!(tile.pixels().all(|p| p.0 == [0, 0, 0]));
    }
}
